use std::io::{BufRead, BufReader, Read};

use crate::errors::{Result, StaccatoError};

/// Representation of a pair of a surface and features.
pub struct Word {
    surface: String,
    feature: String,
}

impl Word {
    /// Returns the surface string.
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Returns the concatenated feature string.
    pub fn feature(&self) -> &str {
        &self.feature
    }
}

/// Representation of a sentence.
pub struct Example {
    pub(crate) sentence: String,
    pub(crate) tokens: Vec<Word>,
}

/// Representation of an annotated corpus.
pub struct Corpus {
    pub(crate) examples: Vec<Example>,
}

impl Corpus {
    /// Loads a corpus from the given sink, where each line is a pair of
    /// a surface and features separated by a TAB and sentences end with
    /// `EOS`.
    ///
    /// # Errors
    ///
    /// [`StaccatoError`] is returned when an input format is invalid.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);

        let mut examples = vec![];
        let mut tokens: Vec<Word> = vec![];
        for line in buf.lines() {
            let line = line?;
            let mut spl = line.split('\t');
            let surface = spl.next();
            let feature = spl.next();
            let rest = spl.next();
            match (surface, feature, rest) {
                (Some("EOS"), None, None) => {
                    let mut sentence = String::new();
                    for token in &tokens {
                        sentence.push_str(token.surface());
                    }
                    examples.push(Example { sentence, tokens });
                    tokens = vec![];
                }
                (Some(surface), Some(feature), None) if !surface.is_empty() => {
                    tokens.push(Word {
                        surface: surface.to_string(),
                        feature: feature.to_string(),
                    });
                }
                _ => {
                    return Err(StaccatoError::invalid_format(
                        "rdr",
                        "Each line must be a pair of a surface and features or `EOS`",
                    ))
                }
            }
        }

        Ok(Self { examples })
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Checks emptiness.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_corpus() {
        let data = "猫\t名詞,普通名詞,一般,*,猫,ねこ\n\
                    だ\t助動詞,*,*,*,だ,だ\n\
                    EOS\n\
                    走る\t動詞,一般,*,*,走る,はしる\n\
                    EOS\n";
        let corpus = Corpus::from_reader(data.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.examples[0].sentence, "猫だ");
        assert_eq!(corpus.examples[0].tokens.len(), 2);
        assert_eq!(corpus.examples[0].tokens[1].surface(), "だ");
        assert_eq!(corpus.examples[1].tokens[0].feature(), "動詞,一般,*,*,走る,はしる");
    }

    #[test]
    fn test_load_corpus_rejects_garbage() {
        let data = "猫\t名詞\t余分\nEOS\n";
        assert!(Corpus::from_reader(data.as_bytes()).is_err());
    }
}
