// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Parser;
use clap::Subcommand;

use huffzip::compress_with_codes;
use huffzip::decompress;
use huffzip::SymbolCodes;

/// Compress and decompress files with a static Huffman code
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Compress INPUT into OUTPUT
    Compress {
        input: PathBuf,
        output: PathBuf,
        /// Print the code word of every symbol
        #[arg(long)]
        print_codes: bool,
    },

    /// Decompress INPUT into OUTPUT
    Decompress { input: PathBuf, output: PathBuf },

    /// Compress INPUT, decompress the result, and check it matches
    Roundtrip {
        input: PathBuf,
        /// Defaults to <stem>_compressed.huf next to INPUT
        #[arg(long)]
        compressed: Option<PathBuf>,
        /// Defaults to <stem>_decompressed.<ext> next to INPUT
        #[arg(long)]
        decompressed: Option<PathBuf>,
        #[arg(long)]
        print_codes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.mode {
        Mode::Compress {
            input,
            output,
            print_codes,
        } => compress_file(&input, &output, print_codes),
        Mode::Decompress { input, output } => decompress_file(&input, &output),
        Mode::Roundtrip {
            input,
            compressed,
            decompressed,
            print_codes,
        } => {
            let compressed = compressed.unwrap_or_else(|| sibling(&input, "compressed", Some("huf")));
            let decompressed = decompressed.unwrap_or_else(|| sibling(&input, "decompressed", None));
            ensure_distinct(&input, &decompressed)?;

            compress_file(&input, &compressed, print_codes)?;
            decompress_file(&compressed, &decompressed)?;

            let original = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let restored = fs::read(&decompressed)
                .with_context(|| format!("reading {}", decompressed.display()))?;
            if original != restored {
                bail!(
                    "{} does not match {}",
                    decompressed.display(),
                    input.display()
                );
            }
            log::info!("round trip of {} verified", input.display());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn compress_file(input: &Path, output: &Path, print_codes: bool) -> anyhow::Result<()> {
    let infile = File::open(input).with_context(|| format!("opening {}", input.display()))?;

    let (stats, codes) = write_output(input, output, |outfile| {
        compress_with_codes(BufReader::new(infile), BufWriter::new(outfile))
            .with_context(|| format!("compressing {} into {}", input.display(), output.display()))
    })?;

    if print_codes {
        print_code_table(&codes);
    }
    log::info!(
        "{}: {} bytes -> {} bytes ({} distinct symbols, {} payload bits)",
        input.display(),
        stats.symbols,
        stats.compressed_bytes(),
        stats.distinct,
        stats.payload_bits
    );
    Ok(())
}

fn decompress_file(input: &Path, output: &Path) -> anyhow::Result<()> {
    let infile = File::open(input).with_context(|| format!("opening {}", input.display()))?;

    let written = write_output(input, output, |outfile| {
        decompress(BufReader::new(infile), BufWriter::new(outfile))
            .with_context(|| format!("decompressing {} into {}", input.display(), output.display()))
    })?;

    log::info!("{}: restored {} bytes", output.display(), written);
    Ok(())
}

/// Fail if `output` names the same file as `input`. Creating the output
/// truncates it, which would destroy the input before it is read.
fn ensure_distinct(input: &Path, output: &Path) -> anyhow::Result<()> {
    let input_path =
        fs::canonicalize(input).with_context(|| format!("resolving {}", input.display()))?;
    if let Ok(output_path) = fs::canonicalize(output) {
        if input_path == output_path {
            bail!(
                "output {} is the same file as input {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

/// Create `path` and hand it to `f`. If `f` fails the file is removed, so a
/// failed run never leaves a half-written output behind. `path` must not be
/// `input`.
fn write_output<T, F>(input: &Path, path: &Path, f: F) -> anyhow::Result<T>
where
    F: FnOnce(File) -> anyhow::Result<T>,
{
    ensure_distinct(input, path)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match f(file) {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(path) {
                log::warn!("could not remove {}: {}", path.display(), remove_err);
            }
            Err(e)
        }
    }
}

/// `dir/stem.ext` -> `dir/stem_<suffix>.<ext>`, with `ext` replaced when given.
fn sibling(input: &Path, suffix: &str, ext: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, suffix);
    if let Some(ext) = ext.map(str::to_owned).or_else(|| {
        input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
    }) {
        name.push('.');
        name.push_str(&ext);
    }
    input.with_file_name(name)
}

fn print_code_table(symbol_codes: &SymbolCodes) {
    for (sym, code) in symbol_codes.iter() {
        println!("{}\t{}", printable(sym), code);
    }
}

fn printable(sym: u8) -> String {
    if sym.is_ascii_graphic() {
        (sym as char).to_string()
    } else {
        format!("{:#04x}", sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_paths() {
        assert_eq!(
            sibling(Path::new("dir/notes.txt"), "compressed", Some("huf")),
            PathBuf::from("dir/notes_compressed.huf")
        );
        assert_eq!(
            sibling(Path::new("dir/notes.txt"), "decompressed", None),
            PathBuf::from("dir/notes_decompressed.txt")
        );
        assert_eq!(
            sibling(Path::new("README"), "decompressed", None),
            PathBuf::from("README_decompressed")
        );
    }

    #[test]
    fn same_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.txt");
        fs::write(&input, b"keep me").unwrap();

        assert!(ensure_distinct(&input, &input).is_err());
        assert!(ensure_distinct(&input, &dir.path().join(".").join("data.txt")).is_err());
        assert!(ensure_distinct(&input, &dir.path().join("other.huf")).is_ok());

        let result = write_output(&input, &input, |_| -> anyhow::Result<()> {
            panic!("output must not be created")
        });
        assert!(result.is_err());
        assert_eq!(fs::read(&input).unwrap(), b"keep me");
    }

    #[test]
    fn printable_symbols() {
        assert_eq!(printable(b'a'), "a");
        assert_eq!(printable(b' '), "0x20");
        assert_eq!(printable(0), "0x00");
    }
}
