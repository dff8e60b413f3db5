use std::io::{BufRead, BufReader, Read};

use crate::common::NUM_POS_FIELD;
use crate::errors::Result;
use crate::utils::parse_csv_row;

/// One row of the seed lexicon.
pub(crate) struct SeedEntry {
    pub(crate) surface: String,
    pub(crate) prefix: String,
    pub(crate) feature: String,
}

/// Seed lexicon parsed from a MeCab-style CSV:
/// `surface,lid,rid,cost,pos1,pos2,…,lemma,…`. Surfaces may be
/// double-quoted to protect embedded commas.
pub(crate) struct SeedLexicon {
    pub(crate) entries: Vec<SeedEntry>,
}

impl SeedLexicon {
    /// Reads the lexicon, skipping malformed rows with a diagnostic.
    pub(crate) fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);
        let mut entries = vec![];
        for (lnum, line) in buf.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let fields = parse_csv_row(&line);
            if fields.len() <= NUM_POS_FIELD || fields[0].is_empty() {
                eprintln!("skipped malformed lexicon row {}: {}", lnum + 1, line);
                continue;
            }
            let feats = &fields[4..];
            entries.push(SeedEntry {
                surface: fields[0].clone(),
                prefix: feats[..NUM_POS_FIELD.min(feats.len())].join(","),
                feature: feats.join(","),
            });
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lexicon() {
        let csv = "猫,0,0,0,名詞,普通名詞,一般,*,猫,ねこ\n\
                   \"1,2-ジクロロエタン\",0,0,0,名詞,普通名詞,一般,*,*,*\n";
        let lex = SeedLexicon::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(lex.entries.len(), 2);
        assert_eq!(lex.entries[0].surface, "猫");
        assert_eq!(lex.entries[0].prefix, "名詞,普通名詞,一般,*");
        assert_eq!(lex.entries[0].feature, "名詞,普通名詞,一般,*,猫,ねこ");
        assert_eq!(lex.entries[1].surface, "1,2-ジクロロエタン");
    }

    #[test]
    fn test_read_lexicon_skips_short_rows() {
        let csv = "猫,0,0,0\n犬,0,0,0,名詞,普通名詞,一般,*,犬,いぬ\n";
        let lex = SeedLexicon::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(lex.entries.len(), 1);
        assert_eq!(lex.entries[0].surface, "犬");
    }
}
