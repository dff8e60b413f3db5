//! Container of resultant tokens.

use std::borrow::Cow;

/// Resultant token.
///
/// The surface borrows from the input line. The feature is trimmed of
/// the leading TAB and trailing newline the feature blob embeds; tokens
/// concatenated from unknown runs report the short POS prefix followed
/// by `,*,*,*`.
pub struct Token<'a> {
    surface: &'a str,
    feature: Cow<'a, str>,
}

impl<'a> Token<'a> {
    #[inline(always)]
    pub(crate) fn new(surface: &'a str, feature: Cow<'a, str>) -> Self {
        Self { surface, feature }
    }

    /// Gets the surface string of the token.
    #[inline(always)]
    pub fn surface(&self) -> &str {
        self.surface
    }

    /// Gets the comma-separated feature string of the token.
    #[inline(always)]
    pub fn feature(&self) -> &str {
        &self.feature
    }
}

impl<'a> std::fmt::Debug for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("feature", &self.feature())
            .finish()
    }
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.surface(), self.feature())
    }
}
