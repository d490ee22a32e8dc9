//! ASCII-bitstream converter: packs one-'0'/'1'-character-per-bit text into
//! raw binary, eight characters per byte. Trailing characters beyond a
//! multiple of 8 are discarded.

use std::path::PathBuf;

use clap::Parser;
use randshell_core::convert_ascii_file;

#[derive(Parser)]
#[command(version)]
#[command(about = "Pack an ASCII '0'/'1' bitstream file into raw binary")]
struct Args {
    /// ASCII bitstream input file
    input: PathBuf,

    /// Packed binary output file
    output: PathBuf,

    /// Print failure detail to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    match convert_ascii_file(&args.input, &args.output) {
        Ok(bytes_written) => {
            println!("{} bytes written to {}", bytes_written, args.output.display());
        }
        Err(error) => {
            log::error!("ascii2bin: {error}");
            if args.verbose {
                eprintln!("[pid {}] ascii2bin: {error}", std::process::id());
            }
            std::process::exit(1);
        }
    }
}
