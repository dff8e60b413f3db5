//! Pattern mining from a seed lexicon and an annotated corpus.
//!
//! The trainer interns every dictionary surface and a window of corpus
//! prefixes as pattern candidates, counts their support per feature and
//! match length, prunes candidates dominated by a shorter prefix, and
//! emits the surviving patterns in descending count order. The emitted
//! text file is what the compiler turns into the binary artifacts.

pub(crate) mod corpus;
pub(crate) mod lexicon;

use std::collections::BTreeMap;
use std::io::{BufWriter, Read, Write};

use hashbrown::HashMap;

use crate::common::NUM_POS_FIELD;
use crate::errors::{Result, StaccatoError};
use crate::interner::Interner;
use crate::utf8;

pub use corpus::Corpus;
use lexicon::SeedLexicon;

/// Code points seeded as single-character patterns, by character type:
/// numeric, alphabetic, and kana.
const CHAR_SEEDS: [&str; 3] = [
    "０１２３４５６７８９〇一二三四五六七八九十百千万億兆数・",
    "ａｂｃｄｅｆｇｈｉｊｋｌｍｎｏｐｑｒｓｔｕｖｗｘｙｚＡＢＣＤＥＦＧＨＩＪＫＬＭＮＯＰＱＲＳＴＵＶＷＸＹＺ＠：／．",
    "ァアィイゥウェエォオカガキギクグケゲコゴサザシジスズセゼソゾタダチヂッツヅテデトドナニヌネノハバパヒビピフブプヘベペホボポマミムメモャヤュユョヨラリルレロヮワヰヱヲンヴヵヶヷヸヹヺーヽヾヿ",
];

/// Support of one pattern candidate: feature id to (match length of the
/// first occurrence, total count).
type FeatureSupport = BTreeMap<u32, (usize, u64)>;

/// Trainer of pattern files.
pub struct Trainer {
    pbag: Interner,
    fbag: Interner,
    /// Per dictionary surface: POS prefix id to full feature id of the
    /// first row carrying that prefix.
    seed_feats: Vec<BTreeMap<u32, u32>>,
    char_classes: HashMap<u32, u32>,
    num_seed: u32,
    max_plen: usize,
}

impl Trainer {
    /// Creates a trainer from a seed lexicon CSV.
    ///
    /// # Errors
    ///
    /// [`StaccatoError`] is returned when the lexicon cannot be read.
    pub fn from_seed_lexicon<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let lexicon = SeedLexicon::from_reader(rdr)?;
        let mut pbag = Interner::new();
        let mut fbag = Interner::new();
        let mut seed_feats: Vec<BTreeMap<u32, u32>> = vec![];
        let mut max_plen = 0;
        for entry in &lexicon.entries {
            max_plen = max_plen.max(entry.surface.len());
            let pi = pbag.to_i(entry.surface.as_bytes());
            if pi as usize == seed_feats.len() {
                seed_feats.push(BTreeMap::new());
            }
            let fi_pos = fbag.to_i(entry.prefix.as_bytes());
            let fi = fbag.to_i(entry.feature.as_bytes());
            // The first row wins when a surface repeats a POS prefix.
            seed_feats[pi as usize].entry(fi_pos).or_insert(fi);
        }

        let mut char_classes = HashMap::new();
        for (class, seeds) in CHAR_SEEDS.iter().enumerate() {
            for ch in seeds.chars() {
                char_classes.insert(ch as u32, class as u32);
                pbag.to_i(ch.to_string().as_bytes());
            }
        }
        let num_seed = pbag.len() as u32;

        Ok(Self {
            pbag,
            fbag,
            seed_feats,
            char_classes,
            num_seed,
            max_plen,
        })
    }

    /// Character type of a byte span: the common class of its characters
    /// (0 numeric, 1 alphabetic, 2 kana), or 3 when the span is empty,
    /// mixes classes, or contains an unclassified character.
    fn char_type(&self, span: &[u8]) -> u32 {
        let mut class = None;
        let mut pos = 0;
        while pos < span.len() {
            let (cp, len) = utf8::decode(&span[pos..]);
            match (self.char_classes.get(&cp), class) {
                (None, _) => return 3,
                (Some(&c), Some(prev)) if c != prev => return 3,
                (Some(&c), _) => class = Some(c),
            }
            pos += len;
        }
        class.unwrap_or(3)
    }

    /// Mines and prunes patterns over `corpus`, consuming the trainer.
    ///
    /// # Errors
    ///
    /// [`StaccatoError`] is returned when interning overflows.
    pub fn train(mut self, corpus: &Corpus) -> Result<Model> {
        let mut support: Vec<FeatureSupport> = vec![];
        support.resize_with(self.pbag.len(), FeatureSupport::new);
        let mut unseen_counts: Vec<u64> = vec![0; self.fbag.len()];

        eprintln!("mining patterns from {} sentences...", corpus.len());
        for example in &corpus.examples {
            let sent = example.sentence.as_bytes();
            let mut f_prev: Vec<u8> = b"\tBOS".to_vec();
            let mut p = 0;
            for word in &example.tokens {
                let tlen = word.surface().len();
                let feature = word.feature().as_bytes();
                let fi = self.fbag.to_i(feature);
                let prefix_len = nth_comma_offset(feature, NUM_POS_FIELD);
                let fi_pos = self.fbag.to_i(&feature[..prefix_len]);

                let mut found: Vec<(u32, u32, usize)> = vec![];
                let limit = (p + self.max_plen).min(sent.len());
                let mut q = p + tlen;
                while q <= limit {
                    let pi = self.pbag.to_i(&sent[p..q]);
                    let fresh = pi as usize >= support.len();
                    found.push((pi, fi, tlen));
                    let mut ctx_key = sent[p..q].to_vec();
                    ctx_key.extend_from_slice(&f_prev);
                    found.push((self.pbag.to_i(&ctx_key), fi, tlen));
                    if fresh {
                        break;
                    }
                    if q == sent.len() {
                        break;
                    }
                    q += utf8::len_from_first_byte(sent[q]);
                }

                // Tokens outside the seed vocabulary leave a POS-only
                // pattern so the context still guides unseen words.
                let known = self.pbag.find(&sent[p..p + tlen]);
                if known.map_or(true, |pi| pi >= self.num_seed)
                    && self.char_type(&sent[p..p + tlen]) != 0
                {
                    if unseen_counts.len() <= fi_pos as usize {
                        unseen_counts.resize(fi_pos as usize + 1, 0);
                    }
                    unseen_counts[fi_pos as usize] += 1;
                    let mut unk_feat = self.fbag.to_s(fi_pos).to_vec();
                    unk_feat.extend_from_slice(b",*,*,*");
                    let fi_unk = self.fbag.to_i(&unk_feat);
                    found.push((self.pbag.to_i(&f_prev), fi_unk, 0));
                }

                support.resize_with(self.pbag.len(), FeatureSupport::new);
                for (pi, fi, tlen) in found {
                    let cell = support[pi as usize].entry(fi).or_insert((tlen, 0));
                    cell.1 += 1;
                }

                f_prev.clear();
                f_prev.push(b'\t');
                f_prev.extend_from_slice(&feature[..prefix_len]);
                p += tlen;
            }
        }
        eprintln!("done; {} pattern candidates", self.pbag.len());

        if self.fbag.is_empty() {
            return Err(StaccatoError::invalid_argument(
                "lexicon",
                "no features seen in the lexicon or the corpus",
            ));
        }
        self.prune(support, unseen_counts)
    }

    /// Keeps, for each candidate, the most supported `(length, feature)`
    /// and drops candidates dominated by a shorter kept prefix with the
    /// same decision.
    fn prune(mut self, support: Vec<FeatureSupport>, unseen_counts: Vec<u64>) -> Result<Model> {
        let max_fi = unseen_counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map_or(0, |(i, _)| i as u32);

        let mut candidates: Vec<(Vec<u8>, u32)> = (0..self.pbag.len() as u32)
            .map(|pi| (self.pbag.to_s(pi).to_vec(), pi))
            .collect();
        candidates.sort_unstable();

        eprintln!("pruning patterns...");
        let mut kept: BTreeMap<Vec<u8>, (usize, u32)> = BTreeMap::new();
        let mut order: Vec<(u64, usize)> = vec![];
        for (i, (pattern, pi)) in candidates.iter().enumerate() {
            let mut bytes = pattern.len();
            let mut fi = max_fi;
            let mut count = 0;
            let fi2sc = &support[*pi as usize];
            if fi2sc.is_empty() {
                // Unseen seeds: dictionary words take the POS their
                // prefix most often left unmatched; bare character seeds
                // keep the overall favorite.
                if let Some(fi2fi) = self.seed_feats.get(*pi as usize) {
                    let mut best = None;
                    for (&fi_pos, &full) in fi2fi {
                        let c = unseen_counts.get(fi_pos as usize).copied().unwrap_or(0);
                        if best.map_or(true, |(bc, _)| c >= bc) {
                            best = Some((c, full));
                        }
                    }
                    if let Some((_, full)) = best {
                        fi = full;
                    }
                }
            } else {
                let mut length_counts = vec![0u64; self.max_plen + 1];
                for (_, &(tlen, c)) in fi2sc {
                    if let Some(cell) = length_counts.get_mut(tlen) {
                        *cell += c;
                    }
                    count += c;
                }
                let mut max_count = 0;
                for (len, &c) in length_counts.iter().enumerate() {
                    if c >= max_count {
                        // =: prefer the longer match
                        max_count = c;
                        bytes = len;
                    }
                }
                let mut max_sfc = 0;
                for (&f, &(tlen, c)) in fi2sc {
                    if tlen == bytes && c > max_sfc {
                        fi = f;
                        max_sfc = c;
                    }
                }
                if let Some(decision) = longest_kept_prefix(&kept, pattern) {
                    if decision == (bytes, fi) {
                        continue;
                    }
                }
            }
            order.push((count, i));
            kept.insert(pattern.clone(), (bytes, fi));
        }
        eprintln!("done; {} -> {} patterns", support.len(), kept.len());

        order.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let mut entries = vec![];
        for (count, i) in order {
            let (pattern, _) = &candidates[i];
            let &(bytes, fi) = &kept[pattern];
            let ctype = if bytes > 0 {
                self.char_type(&pattern[..bytes])
            } else {
                0
            };
            entries.push(PatternEntry {
                count,
                key: pattern.clone(),
                bytes,
                ctype,
                feature: self.fbag.to_s(fi).to_vec(),
            });
        }
        Ok(Model { entries })
    }
}

/// One emitted pattern.
struct PatternEntry {
    count: u64,
    key: Vec<u8>,
    bytes: usize,
    ctype: u32,
    feature: Vec<u8>,
}

/// Mined patterns, ready to be written as a pattern file.
pub struct Model {
    entries: Vec<PatternEntry>,
}

impl Model {
    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks emptiness.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the pattern file consumed by the compiler.
    ///
    /// # Errors
    ///
    /// [`StaccatoError`] is returned on a write failure.
    pub fn write_patterns<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        for e in &self.entries {
            write!(wtr, "{}\t", e.count)?;
            wtr.write_all(&e.key)?;
            // Patterns without a context column still take both tabs.
            if !e.key.contains(&b'\t') {
                wtr.write_all(b"\t")?;
            }
            write!(wtr, "\t{}\t{}\t", e.bytes, e.ctype)?;
            wtr.write_all(&e.feature)?;
            wtr.write_all(b"\n")?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Byte offset of the comma closing the `n`-th field, or the length when
/// there are fewer fields.
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

/// Longest proper prefix of `pattern` present in `kept`.
fn longest_kept_prefix(
    kept: &BTreeMap<Vec<u8>, (usize, u32)>,
    pattern: &[u8],
) -> Option<(usize, u32)> {
    for len in (1..pattern.len()).rev() {
        if let Some(&decision) = kept.get(&pattern[..len]) {
            return Some(decision);
        }
    }
    None
}
