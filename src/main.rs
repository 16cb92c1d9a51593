use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lenzu::io_utils::{io_cli_error, lenzu_cli_error, simple_cli_error};
use lenzu::{
    compress_to, decode_from_reader, inspect, CompressorOptions, DecodeConfig, EncodeConfig,
    DEFAULT_MAX_OUTPUT_LEN,
};

/// Compress, decompress and inspect LenZu streams.
#[derive(Parser)]
#[command(name = "lenzu", version)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decompress a LenZu stream
    Decompress {
        input: PathBuf,
        output: PathBuf,
        /// Keep the output even if the checksum does not match
        #[arg(long)]
        no_verify: bool,
        /// Refuse streams declaring more than this many bytes
        #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_OUTPUT_LEN)]
        max_output: usize,
    },
    /// Wrap a file in a literal-only LenZu stream
    Compress {
        input: PathBuf,
        output: PathBuf,
        /// Table bit count; blocks hold 2^N bytes
        #[arg(long, default_value_t = 7)]
        bits: u8,
    },
    /// Print the header and compressor options
    Info {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct InfoReport {
    file_len: usize,
    version: String,
    decompressed_length: u32,
    checksum: String,
    options: CompressorOptions,
    huff_bit_count: u8,
    first_real_entry: usize,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);
    match args.command {
        Command::Decompress {
            input,
            output,
            no_verify,
            max_output,
        } => {
            let config = DecodeConfig {
                max_output_len: max_output,
                verify_checksum: !no_verify,
            };
            decompress_file(&input, &output, &config)
        }
        Command::Compress {
            input,
            output,
            bits,
        } => compress_file(&input, &output, &EncodeConfig { huff_bit_count: bits }),
        Command::Info { input, json } => print_info(&input, json),
    }
}

fn decompress_file(
    input: &Path,
    output: &Path,
    config: &DecodeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input).map_err(|e| io_cli_error("opening input file", input, e))?;
    let data = decode_from_reader(BufReader::new(file), config)
        .map_err(|e| lenzu_cli_error("decompressing", input, e))?;
    fs::write(output, &data).map_err(|e| io_cli_error("writing output file", output, e))?;
    info!(bytes = data.len(), output = %output.display(), "decompressed");
    Ok(())
}

fn compress_file(
    input: &Path,
    output: &Path,
    config: &EncodeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let src = File::open(input).map_err(|e| io_cli_error("opening input file", input, e))?;
    let dst = File::create(output).map_err(|e| io_cli_error("creating output file", output, e))?;
    let mut dst = BufWriter::new(dst);
    let written = compress_to(BufReader::new(src), &mut dst, config)
        .map_err(|e| lenzu_cli_error("compressing", input, e))?;
    dst.flush()
        .map_err(|e| io_cli_error("writing output file", output, e))?;
    info!(bytes = written, output = %output.display(), "compressed");
    Ok(())
}

fn print_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input).map_err(|e| io_cli_error("reading input file", input, e))?;
    let (header, options) = inspect(&data).map_err(|e| lenzu_cli_error("inspecting", input, e))?;
    let report = InfoReport {
        file_len: data.len(),
        version: hex::encode(header.version),
        decompressed_length: header.decompressed_length,
        checksum: format!("{:016x}", header.checksum),
        options,
        huff_bit_count: options.huff_bit_count(),
        first_real_entry: options.first_real_entry(),
    };
    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| simple_cli_error(&format!("serializing report: {e}")))?;
        println!("{text}");
    } else {
        println!("file length:         {}", report.file_len);
        println!("version:             {}", report.version);
        println!("decompressed length: {}", report.decompressed_length);
        println!("checksum:            {}", report.checksum);
        println!("options:             {}", hex::encode(options.to_bytes()));
        println!(
            "huffman bit count:   {} ({} terminals)",
            report.huff_bit_count, report.first_real_entry
        );
    }
    Ok(())
}
