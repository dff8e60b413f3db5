//! Compilation of a pattern file into the four binary artifacts.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;

use crate::common::{CP_MAX, FEAT_UNK, FEAT_UNK_TAIL, NUM_POS_FIELD};
use crate::dictionary::charmap::CodeCounter;
use crate::dictionary::pattern::{MatchPayload, PatternRecord};
use crate::errors::{Result, StaccatoError};
use crate::interner::Interner;
use crate::trie::Trie;
use crate::utf8;

/// The four compiled artifacts, kept in memory until saved or loaded.
pub struct ModelData {
    pub(crate) trie: Vec<u8>,
    pub(crate) c2i: Vec<u8>,
    pub(crate) p2f: Vec<u8>,
    pub(crate) features: Vec<u8>,
}

/// Appends `.ext` to a basename, keeping the directory part intact.
pub(crate) fn artifact_path(base: &Path, ext: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Byte offset of the comma closing the `n`-th field of `s`, or the end
/// of `s` when there are fewer fields.
fn nth_comma_offset(s: &[u8], n: usize) -> usize {
    let mut seen = 0;
    for (i, &b) in s.iter().enumerate() {
        if b == b',' {
            seen += 1;
            if seen == n {
                return i;
            }
        }
    }
    s.len()
}

impl ModelData {
    /// Compiles a pattern file.
    ///
    /// Each line reads `count TAB pattern TAB context TAB bytes TAB ctype
    /// TAB feature`, with an empty context column for unconditioned
    /// patterns. Malformed lines are skipped with a diagnostic on stderr.
    pub fn compile<R>(rdr: R) -> Result<Self>
    where
        R: BufRead,
    {
        let mut fbag = Interner::with_seed("\tBOS");
        let mut fbag_full = Interner::with_seed(&format!("{FEAT_UNK}{FEAT_UNK_TAIL}"));

        // Pattern id 0 is the unknown/default record. Its feature is the
        // seed string above; its context is the first part-of-speech
        // prefix the file will intern.
        let mut fs2pid = HashMap::new();
        fs2pid.insert((1u64 << 32) | 2, 0u32);
        let mut p2f: Vec<u64> = vec![(1 << 32) | 2];

        let mut counter = CodeCounter::new();
        let mut keys: Vec<(Vec<u8>, u64)> = vec![];

        for (lnum, line) in rdr.lines().enumerate() {
            let line = line?;
            let mut cols = line.splitn(6, '\t');
            let parsed = (
                cols.next().and_then(|c| c.parse::<u64>().ok()),
                cols.next(),
                cols.next(),
                cols.next().and_then(|c| c.parse::<u64>().ok()),
                cols.next().and_then(|c| c.parse::<u64>().ok()),
                cols.next(),
            );
            let (count, pattern, context, bytes, ctype, feature) = match parsed {
                (Some(n), Some(p), Some(x), Some(b), Some(t), Some(f)) => (n, p, x, b, t, f),
                _ => {
                    eprintln!("skipped malformed pattern line {}: {}", lnum + 1, line);
                    continue;
                }
            };

            let pattern = pattern.as_bytes().to_vec();
            let mut pos = 0;
            while pos < pattern.len() {
                let (cp, len) = utf8::decode(&pattern[pos..]);
                counter.add(cp as usize, count + 1);
                pos += len;
            }

            let fi_prev = if context.is_empty() {
                0
            } else {
                let fi_prev = u64::from(fbag.to_i(format!("\t{context}").as_bytes())) + 1;
                counter.extend_context(fi_prev as usize);
                counter.add(fi_prev as usize + CP_MAX, count + 1);
                if fi_prev > 0xFFF {
                    return Err(StaccatoError::invalid_format(
                        "patterns",
                        "too many part-of-speech contexts",
                    ));
                }
                fi_prev
            };
            if pattern.is_empty() && fi_prev == 0 {
                eprintln!("skipped pattern line {} with no key", lnum + 1);
                continue;
            }

            let full = format!("\t{feature}\n");
            let prefix_len = nth_comma_offset(full.as_bytes(), NUM_POS_FIELD).min(full.len());
            let fi_pos = u64::from(fbag.to_i(&full.as_bytes()[..prefix_len])) + 1;
            let fi = u64::from(fbag_full.to_i(full.as_bytes())) + 1;
            counter.extend_context(fi_pos as usize);

            let next_id = fs2pid.len() as u32;
            let pid = *fs2pid.entry((fi << 32) | fi_pos).or_insert(next_id);
            if pid == next_id {
                p2f.push((fi << 32) | fi_pos);
            }

            let payload = MatchPayload::new(
                u32::try_from(bytes)?,
                u32::try_from(ctype)?,
                pid,
            )
            .ok_or_else(|| {
                StaccatoError::invalid_format("patterns", format!("field overflow at line {}", lnum + 1))
            })?;
            keys.push((pattern, (u64::from(payload.raw()) << 12) | fi_prev));
        }

        let c2i_full = counter.into_sids()?;

        let mut features = vec![];
        let mut offsets = vec![];
        fbag_full.serialize(&mut features, &mut offsets);

        for rec in &mut p2f {
            let fi = (*rec >> 32) as usize;
            let fi_pos = (*rec & 0xFFFF_FFFF) as usize;
            let full = fbag_full.to_s(fi as u32 - 1);
            let surface_len = nth_comma_offset(full, NUM_POS_FIELD).min(full.len());
            *rec = PatternRecord::new(
                offsets[fi - 1] as u64,
                full.len() as u64,
                surface_len as u64,
                u64::from(c2i_full[fi_pos + CP_MAX]),
            )
            .ok_or_else(|| StaccatoError::invalid_format("patterns", "feature record overflow"))?
            .raw();
        }

        let mut trie = Trie::new();
        for (pattern, key) in &keys {
            let mut syms: Vec<u16> = vec![];
            let mut pos = 0;
            while pos < pattern.len() {
                let (cp, len) = utf8::decode(&pattern[pos..]);
                syms.push(c2i_full[cp as usize]);
                pos += len;
            }
            let ctx = (key & 0xFFF) as usize;
            if ctx != 0 {
                syms.push(c2i_full[ctx + CP_MAX]);
            }
            trie.update(&syms, (key >> 12) as u32 as i32)?;
        }

        let mut c2i = Vec::with_capacity((CP_MAX + 2) * 2);
        for sid in &c2i_full[..CP_MAX + 2] {
            c2i.extend_from_slice(&sid.to_le_bytes());
        }
        let mut p2f_bytes = Vec::with_capacity(p2f.len() * 8);
        for rec in &p2f {
            p2f_bytes.extend_from_slice(&rec.to_le_bytes());
        }

        Ok(Self {
            trie: trie.serialize_to_vec(),
            c2i,
            p2f: p2f_bytes,
            features,
        })
    }

    /// Writes the artifacts next to `base` as `base.da`, `base.c2i`,
    /// `base.p2f`, and `base.fs`.
    pub fn save<P>(&self, base: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let base = base.as_ref();
        for (ext, bytes) in [
            ("da", &self.trie),
            ("c2i", &self.c2i),
            ("p2f", &self.p2f),
            ("fs", &self.features),
        ] {
            let path = artifact_path(base, ext);
            let file =
                File::create(&path).map_err(|e| StaccatoError::model_io(path.clone(), e))?;
            let mut wtr = BufWriter::new(file);
            wtr.write_all(bytes)
                .map_err(|e| StaccatoError::model_io(path.clone(), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CP_BOS;

    fn sid_of(data: &ModelData, cp: usize) -> u16 {
        u16::from_le_bytes([data.c2i[cp * 2], data.c2i[cp * 2 + 1]])
    }

    #[test]
    fn test_compile_counts_weight_order() {
        let patterns = "9\t猫\t\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n\
                        1\t犬\t\t3\t3\t名詞,普通名詞,一般,*,犬,いぬ\n";
        let data = ModelData::compile(patterns.as_bytes()).unwrap();
        let neko = sid_of(&data, '猫' as usize);
        let inu = sid_of(&data, '犬' as usize);
        assert_ne!(neko, 0);
        assert_ne!(inu, 0);
        assert!(neko < inu);
    }

    #[test]
    fn test_compile_bos_context_is_mapped() {
        let patterns = "5\t猫\tBOS\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n";
        let data = ModelData::compile(patterns.as_bytes()).unwrap();
        assert_ne!(sid_of(&data, CP_BOS), 0);
    }

    #[test]
    fn test_compile_without_bos_patterns() {
        let patterns = "5\t猫\t\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n";
        let data = ModelData::compile(patterns.as_bytes()).unwrap();
        assert_eq!(sid_of(&data, CP_BOS), 0);
    }

    #[test]
    fn test_compile_skips_malformed_lines() {
        let patterns = "garbage\n5\t猫\t\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n";
        let data = ModelData::compile(patterns.as_bytes()).unwrap();
        assert_ne!(sid_of(&data, '猫' as usize), 0);
    }

    #[test]
    fn test_compile_dedups_feature_records() {
        // Two patterns with the same feature share one record; the file
        // always carries the built-in unknown record at id 0.
        let patterns = "5\tねこ\t\t6\t2\t名詞,普通名詞,一般,*\n\
                        4\tいぬ\t\t6\t2\t名詞,普通名詞,一般,*\n\
                        3\tとり\t\t6\t2\t動詞,一般,*,*\n";
        let data = ModelData::compile(patterns.as_bytes()).unwrap();
        assert_eq!(data.p2f.len() / 8, 3);
    }

    #[test]
    fn test_unknown_record_layout() {
        let patterns = "5\t猫\t\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n";
        let data = ModelData::compile(patterns.as_bytes()).unwrap();
        let raw = u64::from_le_bytes(data.p2f[..8].try_into().unwrap());
        let rec = PatternRecord::from_raw(raw);
        let full = &data.features[rec.feat_offset()..rec.feat_offset() + rec.full_feat_len()];
        assert_eq!(full, format!("{FEAT_UNK}{FEAT_UNK_TAIL}").as_bytes());
        let prefix = &data.features[rec.feat_offset()..rec.feat_offset() + rec.surface_feat_len()];
        assert_eq!(prefix, FEAT_UNK.as_bytes());
    }
}
