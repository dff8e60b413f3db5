//! Common constants shared by the compiler and the runtime.

/// Largest Unicode scalar value. Synthetic symbol ids (BOS and the
/// part-of-speech contexts) live directly above it.
pub const CP_MAX: usize = 0x10FFFF;

/// Synthetic code point denoting the beginning of a sentence.
pub const CP_BOS: usize = CP_MAX + 1;

/// Bit width of a single trie symbol; also the width of the `ctx_sid`
/// field in a pattern record.
pub const MAX_KEY_BITS: u32 = 14;

/// Bit width of the surface-feature length field in a pattern record.
pub const MAX_FEATURE_BITS: u32 = 7;

/// Number of leading feature fields that form the part-of-speech prefix.
pub const NUM_POS_FIELD: usize = 4;

/// Feature emitted for tokens no pattern accounts for. The wildcard tail
/// `,*,*,*` is appended when the full unknown feature is materialized.
pub const FEAT_UNK: &str = "\t名詞,普通名詞,一般,*";

/// Wildcard lexical fields appended to the POS prefix of concatenated
/// unknown tokens.
pub const FEAT_UNK_TAIL: &str = ",*,*,*\n";

/// Output buffer size of the full-buffering (`-f`) mode.
pub const OUTPUT_BUF_SIZE: usize = 1 << 18;

/// Upper bound on the parent-chain walk in the matcher. The walk is
/// bounded by the trie depth; exceeding the cap is treated as "no
/// POS-conditioned match".
pub const MAX_PARENT_WALK: usize = 1 << 8;
