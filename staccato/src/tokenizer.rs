//! Deterministic pattern-based tokenizer.

pub(crate) mod batch;

use std::ops::Range;

use crate::dictionary::pattern::{MatchPayload, PatternRecord};
use crate::dictionary::Dictionary;
use crate::token::Token;
use crate::utf8;

/// Kana runs are cut once the running surface reaches this many bytes.
const KANA_CONCAT_LIMIT: usize = 18;

/// What the tokenizer writes per line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputMode {
    /// `surface TAB features` per token, lines terminated by `EOS`.
    Tagging,
    /// Surfaces joined by single spaces.
    Segmentation,
}

/// Tokenizer.
pub struct Tokenizer {
    dict: Dictionary,
}

impl Tokenizer {
    /// Creates a new instance.
    pub const fn new(dict: Dictionary) -> Self {
        Self { dict }
    }

    /// Gets the reference to the dictionary.
    pub const fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Tokenizes one line (without its terminating newline) into
    /// structured tokens.
    pub fn tokenize<'a>(&'a self, line: &'a str) -> Vec<Token<'a>> {
        let mut tokens = vec![];
        self.for_each_token(line.as_bytes(), |range, rec, concat| {
            let surface = line.get(range).unwrap_or_default();
            let len = if concat {
                rec.surface_feat_len()
            } else {
                rec.full_feat_len()
            };
            let raw = self.dict.feature_bytes(rec.feat_offset(), len);
            let raw = raw.strip_prefix(b"\t").unwrap_or(raw);
            let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
            let mut feature = String::from_utf8_lossy(raw);
            if concat {
                feature.to_mut().push_str(",*,*,*");
            }
            tokens.push(Token::new(surface, feature));
        });
        tokens
    }

    /// Tokenizes one line (without its terminating newline) and appends
    /// the analysis, including the line terminator, to `out`.
    pub fn tokenize_line_into(&self, line: &[u8], mode: OutputMode, out: &mut Vec<u8>) {
        // The mode decision stays outside the per-token loop.
        match mode {
            OutputMode::Tagging => {
                self.for_each_token(line, |range, rec, concat| {
                    out.extend_from_slice(&line[range]);
                    if concat {
                        out.extend_from_slice(
                            self.dict
                                .feature_bytes(rec.feat_offset(), rec.surface_feat_len()),
                        );
                        out.extend_from_slice(b",*,*,*\n");
                    } else {
                        out.extend_from_slice(
                            self.dict.feature_bytes(rec.feat_offset(), rec.full_feat_len()),
                        );
                    }
                });
                out.extend_from_slice(b"EOS\n");
            }
            OutputMode::Segmentation => {
                let mut first = true;
                self.for_each_token(line, |range, _, _| {
                    if !first {
                        out.push(b' ');
                    }
                    first = false;
                    out.extend_from_slice(&line[range]);
                });
                out.push(b'\n');
            }
        }
    }

    /// Runs the matching loop over one line, invoking `emit` once per
    /// completed token with its byte range, the feature record of its
    /// last match, and whether it was concatenated from several matches.
    fn for_each_token<F>(&self, line: &[u8], mut emit: F)
    where
        F: FnMut(Range<usize>, PatternRecord, bool),
    {
        let mut p = 0;
        let mut tok_start = 0;
        let mut bytes_prev = 0;
        let mut ctype_prev = 0;
        // Before the first match, only the context field is meaningful:
        // it carries the symbol id of the BOS sentinel.
        let mut rec = PatternRecord::from_raw(u64::from(self.dict.bos_sid()));
        let mut bos = true;
        let mut concat = false;
        while p < line.len() {
            let r = MatchPayload::from_raw(self.dict.longest_prefix_search(&line[p..], rec.ctx_sid()));
            let bytes = match r.bytes() {
                0 => utf8::len_from_first_byte(line[p]).min(line.len() - p),
                b => (b as usize).min(line.len() - p),
            };
            let ctype = r.ctype();
            if !bos {
                if ctype_prev != ctype // different character types
                    || ctype_prev == 3 // seen words in non-num/alpha/kana
                    || (ctype_prev == 2 && bytes_prev + bytes >= KANA_CONCAT_LIMIT)
                {
                    emit(tok_start..p, rec, concat);
                    concat = false;
                    tok_start = p;
                } else {
                    concat = true;
                }
            } else {
                bos = false;
            }
            bytes_prev = bytes;
            ctype_prev = ctype;
            rec = self.dict.record(r.pattern_id() as usize);
            p += bytes;
        }
        if !bos {
            emit(tok_start..p, rec, concat);
        }
    }
}
