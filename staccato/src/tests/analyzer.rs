use crate::dictionary::{Dictionary, ModelData};
use crate::tokenizer::{OutputMode, Tokenizer};
use crate::trainer::{Corpus, Trainer};

fn tokenizer_from(patterns: &str) -> Tokenizer {
    Tokenizer::new(Dictionary::from_model(
        ModelData::compile(patterns.as_bytes()).unwrap(),
    ))
}

fn tag(tokenizer: &Tokenizer, line: &str) -> String {
    let mut out = vec![];
    tokenizer.tokenize_line_into(line.as_bytes(), OutputMode::Tagging, &mut out);
    String::from_utf8(out).unwrap()
}

fn segment(tokenizer: &Tokenizer, line: &str) -> String {
    let mut out = vec![];
    tokenizer.tokenize_line_into(line.as_bytes(), OutputMode::Segmentation, &mut out);
    String::from_utf8(out).unwrap()
}

const ALNUM_PATTERNS: &str = "9\tA\t\t1\t1\t名詞,普通名詞,組織名,*,*,*\n\
                              9\tB\t\t1\t1\t名詞,普通名詞,組織名,*,*,*\n\
                              9\tC\t\t1\t1\t名詞,普通名詞,組織名,*,*,*\n\
                              9\t1\t\t1\t0\t名詞,数詞,*,*,*,*\n\
                              9\t2\t\t1\t0\t名詞,数詞,*,*,*,*\n\
                              9\t3\t\t1\t0\t名詞,数詞,*,*,*,*\n";

#[test]
fn test_alpha_numeric_runs_concatenate() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    assert_eq!(
        tag(&tokenizer, "ABC123"),
        "ABC\t名詞,普通名詞,組織名,*,*,*,*\n123\t名詞,数詞,*,*,*,*,*\nEOS\n"
    );

    let tokens = tokenizer.tokenize("ABC123");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].surface(), "ABC");
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,組織名,*,*,*,*");
    assert_eq!(tokens[1].surface(), "123");
    assert_eq!(tokens[1].feature(), "名詞,数詞,*,*,*,*,*");
}

const KANA_PATTERNS: &str = "9\tカタカナカタ\t\t18\t2\t名詞,普通名詞,一般,*,カタカナカタ,かたかなかた\n\
                             8\tカタ\t\t6\t2\t名詞,普通名詞,一般,*,カタ,かた\n\
                             7\tカナ\t\t6\t2\t名詞,普通名詞,一般,*,カナ,かな\n";

#[test]
fn test_short_kana_run_stays_one_token() {
    let tokenizer = tokenizer_from(KANA_PATTERNS);
    let tokens = tokenizer.tokenize("カタカナ");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].surface(), "カタカナ");
    // A concatenated token reports the POS prefix with wildcard fields.
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,*,*,*");
}

#[test]
fn test_long_kana_run_splits() {
    let tokenizer = tokenizer_from(KANA_PATTERNS);
    let tokens = tokenizer.tokenize("カタカナカタカナ");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].surface(), "カタカナカタ");
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,カタカナカタ,かたかなかた");
    assert_eq!(tokens[1].surface(), "カナ");
}

#[test]
fn test_empty_line() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    assert_eq!(tag(&tokenizer, ""), "EOS\n");
    assert_eq!(segment(&tokenizer, ""), "\n");
    assert!(tokenizer.tokenize("").is_empty());
}

#[test]
fn test_unknown_input_falls_through() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    let tokens = tokenizer.tokenize("謎");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].surface(), "謎");
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,*,*,*");

    // Adjacent unknown characters share the type class and concatenate.
    let tokens = tokenizer.tokenize("謎謎");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].surface(), "謎謎");
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,*,*,*");
}

#[test]
fn test_invalid_utf8_is_single_byte_token() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    let mut out = vec![];
    tokenizer.tokenize_line_into(&[0xFF, 0xFE], OutputMode::Segmentation, &mut out);
    assert_eq!(out, b"\xFF\xFE\n");
}

#[test]
fn test_byte_coverage() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    for line in ["ABC123", "A謎B", "謎", "カナ漢字A1", ""] {
        let total: usize = tokenizer
            .tokenize(line)
            .iter()
            .map(|t| t.surface().len())
            .sum();
        assert_eq!(total, line.len(), "line {line:?}");
    }
}

#[test]
fn test_determinism() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    assert_eq!(tag(&tokenizer, "ABC123謎"), tag(&tokenizer, "ABC123謎"));
}

#[test]
fn test_bos_conditioned_pattern() {
    let patterns = "9\t猫\tBOS\t3\t3\t感動詞,*,*,*,にゃー,*\n\
                    8\t猫\t\t3\t3\t名詞,普通名詞,一般,*,猫,ねこ\n";
    let tokenizer = tokenizer_from(patterns);
    let tokens = tokenizer.tokenize("猫猫");
    assert_eq!(tokens.len(), 2);
    // Only the line-initial token sees the BOS context.
    assert_eq!(tokens[0].feature(), "感動詞,*,*,*,にゃー,*");
    assert_eq!(tokens[1].feature(), "名詞,普通名詞,一般,*,猫,ねこ");
}

#[test]
fn test_context_pattern_without_plain_variant() {
    // The conditioned reading of "い" exists only as a context pattern;
    // its part-of-speech context is interned before that POS ever
    // appears as a feature prefix.
    let patterns = "9\tあ\t\t3\t3\t動詞,一般,*,*,ある,ある\n\
                    8\tい\t名詞,普通名詞,一般,*\t3\t3\t形容詞,一般,*,*,いい,いい\n\
                    7\tう\t\t3\t3\t名詞,普通名詞,一般,*,う,う\n";
    let tokenizer = tokenizer_from(patterns);
    let tokens = tokenizer.tokenize("うい");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,う,う");
    assert_eq!(tokens[1].feature(), "形容詞,一般,*,*,いい,いい");

    // Without the noun context the matcher falls through to unknown.
    let tokens = tokenizer.tokenize("い");
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,*,*,*");
}

#[test]
fn test_batch_matches_line_by_line() {
    let tokenizer = tokenizer_from(ALNUM_PATTERNS);
    let text = "ABC123\n\nカナ謎\nA1\n";
    for mode in [OutputMode::Tagging, OutputMode::Segmentation] {
        let mut expected = vec![];
        for line in text.lines() {
            tokenizer.tokenize_line_into(line.as_bytes(), mode, &mut expected);
        }
        for num_threads in [1, 3, 0] {
            assert_eq!(
                tokenizer.tokenize_batch(text, mode, num_threads),
                expected,
                "mode {mode:?} threads {num_threads}"
            );
        }
    }
}

#[test]
fn test_trained_model_end_to_end() {
    let lexicon = "吾輩,0,0,0,名詞,普通名詞,一般,*,吾輩,わがはい\n\
                   は,0,0,0,助詞,係助詞,*,*,は,は\n\
                   猫,0,0,0,名詞,普通名詞,一般,*,猫,ねこ\n\
                   で,0,0,0,助動詞,*,*,*,だ,で\n\
                   ある,0,0,0,接尾辞,*,*,*,ある,ある\n\
                   。,0,0,0,特殊,句点,*,*,。,。\n";
    let corpus_text = "吾輩\t名詞,普通名詞,一般,*,吾輩,わがはい\n\
                       は\t助詞,係助詞,*,*,は,は\n\
                       猫\t名詞,普通名詞,一般,*,猫,ねこ\n\
                       で\t助動詞,*,*,*,だ,で\n\
                       ある\t接尾辞,*,*,*,ある,ある\n\
                       。\t特殊,句点,*,*,。,。\n\
                       EOS\n";

    let trainer = Trainer::from_seed_lexicon(lexicon.as_bytes()).unwrap();
    let corpus = Corpus::from_reader(corpus_text.as_bytes()).unwrap();
    let model = trainer.train(&corpus).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("patterns");
    model
        .write_patterns(std::fs::File::create(&base).unwrap())
        .unwrap();

    // The loader compiles the missing artifacts, then reads them back.
    let tokenizer = Tokenizer::new(Dictionary::open(&base).unwrap());

    let line = "吾輩は猫である。";
    let tokens = tokenizer.tokenize(line);
    let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface()).collect();
    assert_eq!(surfaces, ["吾輩", "は", "猫", "で", "ある", "。"]);
    assert_eq!(tokens[0].feature(), "名詞,普通名詞,一般,*,吾輩,わがはい");
    assert_eq!(tokens[5].feature(), "特殊,句点,*,*,。,。");
    let total: usize = tokens.iter().map(|t| t.surface().len()).sum();
    assert_eq!(total, line.len());

    let tagged = tag(&tokenizer, line);
    assert!(tagged.ends_with("EOS\n"));
    assert!(tagged.starts_with("吾輩\t名詞,普通名詞,一般,*,吾輩,わがはい\n"));

    assert_eq!(segment(&tokenizer, "吾輩は猫"), "吾輩 は 猫\n");
}
