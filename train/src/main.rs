use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use staccato::trainer::{Corpus, Trainer};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "train", about = "A program to mine patterns for the analyzer.")]
struct Args {
    /// Seed lexicon file (lex.csv).
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// Annotated corpus: `surface TAB features` lines with `EOS`
    /// sentence separators.
    #[clap(short = 't', long)]
    corpus_in: PathBuf,

    /// File to which the pattern file is output.
    #[clap(short = 'o', long)]
    patterns_out: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Reading the seed lexicon...");
    let trainer = Trainer::from_seed_lexicon(File::open(args.lexicon_in)?)?;
    let corpus = Corpus::from_reader(File::open(args.corpus_in)?)?;

    eprintln!("Mining patterns...");
    let start = Instant::now();
    let model = trainer.train(&corpus)?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the pattern file...: {:?}", &args.patterns_out);
    model.write_patterns(BufWriter::new(File::create(args.patterns_out)?))?;
    eprintln!("{} patterns", model.len());

    Ok(())
}
