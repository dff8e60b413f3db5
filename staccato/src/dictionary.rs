//! Compiled pattern dictionary.
//!
//! A dictionary is four read-only artifacts produced from a pattern file
//! (see [`ModelData`]): the double-array trie (`.da`), the code-point to
//! symbol-id table (`.c2i`), the per-pattern feature records (`.p2f`),
//! and the feature-string blob (`.fs`). All runtime lookups are offset
//! arithmetic over these buffers.

pub(crate) mod builder;
pub(crate) mod charmap;
pub(crate) mod pattern;

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::common::{CP_BOS, MAX_PARENT_WALK};
use crate::dictionary::pattern::PatternRecord;
use crate::errors::{Result, StaccatoError};
use crate::trie::{TrieView, NO_PATH, NO_VALUE};
use crate::utf8;

pub use builder::ModelData;

/// Backing storage of one artifact.
#[derive(Debug)]
enum Buffer {
    Heap(Vec<u8>),
    Mmap(Mmap),
}

impl Buffer {
    fn read(path: &Path) -> Result<Self> {
        std::fs::read(path)
            .map(Self::Heap)
            .map_err(|e| StaccatoError::model_io(path, e))
    }

    fn mmap(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| StaccatoError::model_io(path, e))?;
        // Safety: the mapping is read-only and stays alive as long as the
        // dictionary; truncation of the backing file by another process is
        // outside the supported lifecycle.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| StaccatoError::model_io(path, e))?;
        Ok(Self::Mmap(mmap))
    }

    #[inline(always)]
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Heap(v) => v,
            Self::Mmap(m) => m,
        }
    }
}

/// Dictionary for tokenization.
#[derive(Debug)]
pub struct Dictionary {
    da: Buffer,
    c2i: Buffer,
    p2f: Buffer,
    fs: Buffer,
}

impl Dictionary {
    /// Loads the artifacts next to `base` into heap buffers. When
    /// `base.da` does not exist, all four artifacts are first compiled
    /// from the pattern file at `base`.
    ///
    /// # Errors
    ///
    /// [`StaccatoError`] is returned when an artifact cannot be read or
    /// compiled.
    pub fn open<P>(base: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::open_with(base, Buffer::read)
    }

    /// Like [`Dictionary::open`], but memory-maps the artifacts instead
    /// of reading them.
    pub fn open_mmap<P>(base: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::open_with(base, Buffer::mmap)
    }

    fn open_with<P>(base: P, load: fn(&Path) -> Result<Buffer>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let base = base.as_ref();
        let da_path = builder::artifact_path(base, "da");
        if !da_path.exists() {
            eprintln!("building pattern trie from {}..", base.display());
            let file = File::open(base).map_err(|e| StaccatoError::model_io(base, e))?;
            let data = ModelData::compile(std::io::BufReader::new(file))?;
            data.save(base)?;
        }
        Ok(Self {
            da: load(&da_path)?,
            c2i: load(&builder::artifact_path(base, "c2i"))?,
            p2f: load(&builder::artifact_path(base, "p2f"))?,
            fs: load(&builder::artifact_path(base, "fs"))?,
        })
    }

    /// Wraps freshly compiled artifacts without touching the filesystem.
    pub fn from_model(data: ModelData) -> Self {
        Self {
            da: Buffer::Heap(data.trie),
            c2i: Buffer::Heap(data.c2i),
            p2f: Buffer::Heap(data.p2f),
            fs: Buffer::Heap(data.features),
        }
    }

    /// Number of pattern records.
    pub fn num_patterns(&self) -> usize {
        self.p2f.bytes().len() / 8
    }

    #[inline(always)]
    pub(crate) fn trie(&self) -> TrieView<'_> {
        TrieView::new(self.da.bytes())
    }

    /// Symbol id of a code point; 0 for anything unseen during training.
    #[inline(always)]
    pub(crate) fn sid(&self, cp: u32) -> u16 {
        let i = cp as usize * 2;
        match self.c2i.bytes().get(i..i + 2) {
            Some(b) => u16::from_le_bytes([b[0], b[1]]),
            None => 0,
        }
    }

    /// Symbol id of the beginning-of-sentence sentinel.
    #[inline(always)]
    pub(crate) fn bos_sid(&self) -> u16 {
        self.sid(CP_BOS as u32)
    }

    /// Feature record of a pattern id. Out-of-range ids decode as the
    /// all-zero record.
    #[inline(always)]
    pub(crate) fn record(&self, id: usize) -> PatternRecord {
        let i = id * 8;
        match self.p2f.bytes().get(i..i + 8) {
            Some(b) => PatternRecord::from_raw(u64::from_le_bytes([
                b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            ])),
            None => PatternRecord::default(),
        }
    }

    /// Bytes of a feature-blob segment, clamped to the blob.
    #[inline(always)]
    pub(crate) fn feature_bytes(&self, offset: usize, len: usize) -> &[u8] {
        let fs = self.fs.bytes();
        let start = offset.min(fs.len());
        &fs[start..(start + len).min(fs.len())]
    }

    /// Longest-prefix match over `input`, conditioned on the previous
    /// token's POS symbol `ctx_sid`.
    ///
    /// The trie is walked one character at a time, remembering the last
    /// payload seen. When a context symbol is given, the parent chain of
    /// the deepest reached node is then probed for a `(node, ctx_sid)`
    /// extension; the first hit wins over the unconditioned payload. The
    /// upward walk is capped to defend against a malformed trie.
    pub(crate) fn longest_prefix_search(&self, input: &[u8], ctx_sid: u16) -> u32 {
        let trie = self.trie();
        let mut from = 0;
        let mut from_last = 0;
        let mut best = 0;
        let mut pos = 0;
        loop {
            let (cp, len) = utf8::decode(&input[pos..]);
            let sym = self.sid(cp);
            if sym == 0 {
                break;
            }
            match trie.traverse(sym, &mut from) {
                NO_PATH => break,
                NO_VALUE => {}
                value => {
                    best = value;
                    from_last = from;
                }
            }
            pos += len;
        }
        if ctx_sid == 0 {
            return best as u32;
        }
        for _ in 0..MAX_PARENT_WALK {
            let value = trie.exact_match(&[ctx_sid], from);
            if value != NO_VALUE {
                return value as u32;
            }
            if from == from_last {
                return best as u32;
            }
            let up = trie.check_of(from);
            if up < 0 {
                break;
            }
            from = up as u32;
        }
        best as u32
    }
}
