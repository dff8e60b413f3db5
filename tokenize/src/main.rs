use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use staccato::common::OUTPUT_BUF_SIZE;
use staccato::{Dictionary, OutputMode, Tokenizer};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "tokenize",
    about = "Pattern-based Japanese morphological analyzer"
)]
struct Args {
    /// Pattern directory.
    #[clap(short = 'm', long, default_value = "model/kwdlc")]
    model_dir: PathBuf,

    /// Perform only segmentation.
    #[clap(short = 'w', long)]
    wakachi: bool,

    /// Full output buffering (fast but not interactive).
    #[clap(short = 'f', long)]
    full_buffering: bool,

    /// Memory-map the model instead of reading it into heap buffers.
    #[clap(long)]
    mmap: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let base = args.model_dir.join("patterns");
    let dict = if args.mmap {
        Dictionary::open_mmap(&base)?
    } else {
        Dictionary::open(&base)?
    };
    let tokenizer = Tokenizer::new(dict);
    let mode = if args.wakachi {
        OutputMode::Segmentation
    } else {
        OutputMode::Tagging
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::with_capacity(OUTPUT_BUF_SIZE, stdout.lock());
    let mut buf = Vec::with_capacity(1 << 12);
    for line in stdin.lock().lines() {
        let line = line?;
        buf.clear();
        tokenizer.tokenize_line_into(line.as_bytes(), mode, &mut buf);
        wtr.write_all(&buf)?;
        if !args.full_buffering {
            wtr.flush()?;
        }
    }
    wtr.flush()?;

    Ok(())
}
