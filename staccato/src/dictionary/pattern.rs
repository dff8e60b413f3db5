use crate::common::{MAX_FEATURE_BITS, MAX_KEY_BITS};

const PATTERN_ID_BITS: u32 = 20;
const PATTERN_ID_MASK: u32 = (1 << PATTERN_ID_BITS) - 1;
const CTYPE_BITS: u32 = 3;
const CTYPE_MASK: u32 = (1 << CTYPE_BITS) - 1;
const BYTES_BITS: u32 = 9;

const CTX_SID_MASK: u64 = (1 << MAX_KEY_BITS) - 1;
const SURFACE_LEN_MASK: u64 = (1 << MAX_FEATURE_BITS) - 1;
const FULL_LEN_BITS: u32 = 13;
const FULL_LEN_MASK: u64 = (1 << FULL_LEN_BITS) - 1;
const OFFSET_BITS: u32 = 30;

/// Payload attached to a pattern in the trie.
///
/// The memory layout is
///       bytes = 9 bits (0 means "length of the next UTF-8 character")
///       ctype = 3 bits
///  pattern_id = 20 bits
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct MatchPayload(u32);

impl MatchPayload {
    pub fn new(bytes: u32, ctype: u32, pattern_id: u32) -> Option<Self> {
        if bytes >> BYTES_BITS != 0 {
            return None;
        }
        if ctype >> CTYPE_BITS != 0 {
            return None;
        }
        if pattern_id >> PATTERN_ID_BITS != 0 {
            return None;
        }
        Some(Self(
            (bytes << (CTYPE_BITS + PATTERN_ID_BITS)) | (ctype << PATTERN_ID_BITS) | pattern_id,
        ))
    }

    #[inline(always)]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn bytes(&self) -> u32 {
        self.0 >> (CTYPE_BITS + PATTERN_ID_BITS)
    }

    #[inline(always)]
    pub const fn ctype(&self) -> u32 {
        (self.0 >> PATTERN_ID_BITS) & CTYPE_MASK
    }

    #[inline(always)]
    pub const fn pattern_id(&self) -> u32 {
        self.0 & PATTERN_ID_MASK
    }
}

/// Per-pattern record mapping a pattern id to its feature strings.
///
/// The memory layout is
///       feat_offset = 30 bits
///     full_feat_len = 13 bits
///  surface_feat_len =  7 bits
///           ctx_sid = 14 bits
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct PatternRecord(u64);

impl PatternRecord {
    pub fn new(feat_offset: u64, full_feat_len: u64, surface_feat_len: u64, ctx_sid: u64) -> Option<Self> {
        if feat_offset >> OFFSET_BITS != 0 {
            return None;
        }
        if full_feat_len >> FULL_LEN_BITS != 0 {
            return None;
        }
        if surface_feat_len >> MAX_FEATURE_BITS != 0 {
            return None;
        }
        if ctx_sid >> MAX_KEY_BITS != 0 {
            return None;
        }
        Some(Self(
            (feat_offset << (MAX_KEY_BITS + MAX_FEATURE_BITS + FULL_LEN_BITS))
                | (full_feat_len << (MAX_KEY_BITS + MAX_FEATURE_BITS))
                | (surface_feat_len << MAX_KEY_BITS)
                | ctx_sid,
        ))
    }

    #[inline(always)]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Symbol id this pattern contributes as the previous-POS context of
    /// the next match.
    #[inline(always)]
    pub const fn ctx_sid(&self) -> u16 {
        (self.0 & CTX_SID_MASK) as u16
    }

    /// Length of the short POS-prefix feature.
    #[inline(always)]
    pub const fn surface_feat_len(&self) -> usize {
        ((self.0 >> MAX_KEY_BITS) & SURFACE_LEN_MASK) as usize
    }

    /// Length of the full feature string.
    #[inline(always)]
    pub const fn full_feat_len(&self) -> usize {
        ((self.0 >> (MAX_KEY_BITS + MAX_FEATURE_BITS)) & FULL_LEN_MASK) as usize
    }

    /// Byte offset of the feature string in the feature blob.
    #[inline(always)]
    pub const fn feat_offset(&self) -> usize {
        (self.0 >> (MAX_KEY_BITS + MAX_FEATURE_BITS + FULL_LEN_BITS)) as usize
    }
}
