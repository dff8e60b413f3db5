use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use staccato::dictionary::ModelData;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "compile",
    about = "A program to compile a pattern file into the binary artifacts."
)]
struct Args {
    /// Pattern file; the artifacts are written next to it.
    #[clap(short = 'i', long)]
    patterns_in: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Compiling the pattern file...");
    let start = Instant::now();
    let data = ModelData::compile(BufReader::new(File::open(&args.patterns_in)?))?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the artifacts...: {:?}", &args.patterns_in);
    data.save(&args.patterns_in)?;

    Ok(())
}
