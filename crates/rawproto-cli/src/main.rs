//! rawproto - Inspect and rebuild Protocol Buffers payloads without a schema
//!
//! `rawproto decode` splits a payload into field records and prints them as
//! JSON or text. `rawproto encode` turns a JSON record list back into bytes.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rawproto_core::{decode, decode_hex, encode, json, Field};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, Level};
use tracing_subscriber::EnvFilter;

/// Inspect and rebuild Protocol Buffers payloads without a schema
#[derive(Parser, Debug)]
#[command(name = "rawproto")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a payload into field records
    Decode(DecodeArgs),
    /// Encode JSON field records into a payload
    Encode(EncodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    input: DecodeInput,

    /// Treat stdin as hex text rather than raw bytes
    #[arg(long)]
    stdin_hex: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "records", env = "RAWPROTO_FORMAT")]
    format: OutputFormat,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct DecodeInput {
    /// Payload as a hex string (optionally 0x-prefixed)
    #[arg(short = 'x', long)]
    hex: Option<String>,

    /// Path to a file holding the raw payload
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Path to a JSON record list (reads stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the payload as lowercase hex instead of raw bytes
    #[arg(short = 'x', long)]
    hex: bool,

    /// Write the payload to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    force: bool,
}

/// Output format for decoded payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Ordered JSON list of {field, wire, value} records
    Records,
    /// JSON object keyed by field number, repeated fields as arrays
    Collapsed,
    /// One `number:WIRE value` line per field
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Decode(args) => run_decode(&args),
        Command::Encode(args) => run_encode(&args),
    }
}

/// Decode the selected input and print it
fn run_decode(args: &DecodeArgs) -> Result<()> {
    let fields = read_fields(args)?;
    info!("Decoded {} field(s)", fields.len());

    let rendered = render_fields(&fields, args.format, args.compact)?;
    println!("{}", rendered);
    Ok(())
}

/// Encode a JSON record list and emit the payload
fn run_encode(args: &EncodeArgs) -> Result<()> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read records file: {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read records from stdin")?;
            text
        }
    };

    let fields = parse_records(&text)?;
    let payload = encode(&fields).context("Failed to encode records")?;
    info!("Encoded {} field(s) into {} bytes", fields.len(), payload.len());

    let output = if args.hex {
        let mut line = rawproto_core::bytes_to_hex(&payload).into_bytes();
        line.push(b'\n');
        line
    } else {
        payload.to_vec()
    };

    match &args.output {
        Some(path) => {
            write_output_file(path, &output, args.force)?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&output)
                .and_then(|()| stdout.flush())
                .context("Failed to write payload to stdout")?;
        }
    }

    Ok(())
}

/// Load and decode the payload named by the decode arguments
fn read_fields(args: &DecodeArgs) -> Result<Vec<Field>> {
    if let Some(hex) = &args.input.hex {
        debug!("Decoding hex argument ({} chars)", hex.len());
        return decode_hex(hex.trim()).context("Failed to decode hex payload");
    }

    if let Some(path) = &args.input.file {
        return decode_file(path);
    }

    let mut data = Vec::new();
    std::io::stdin()
        .read_to_end(&mut data)
        .context("Failed to read payload from stdin")?;
    trace!("Read {} bytes from stdin", data.len());

    if args.stdin_hex {
        let text = std::str::from_utf8(&data).context("Hex input on stdin is not UTF-8")?;
        let digits: String = text.split_whitespace().collect();
        decode_hex(&digits).context("Failed to decode hex payload from stdin")
    } else {
        decode(&data).context("Failed to decode payload from stdin")
    }
}

/// Read a raw payload from disk and decode it
fn decode_file(path: &Path) -> Result<Vec<Field>> {
    if !path.is_file() {
        bail!("Input path is not a file: {}", path.display());
    }

    trace!("Reading {}", path.display());
    let data = fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    trace!("Read {} bytes from {}", data.len(), path.display());

    decode(&data).with_context(|| format!("Failed to decode payload: {}", path.display()))
}

/// Parse a JSON record list into field records
fn parse_records(text: &str) -> Result<Vec<Field>> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("Records input is not valid JSON")?;
    json::from_records(&value).context("Invalid field records")
}

/// Render decoded fields in the requested format
fn render_fields(fields: &[Field], format: OutputFormat, compact: bool) -> Result<String> {
    let value = match format {
        OutputFormat::Text => {
            let lines: Vec<String> = fields.iter().map(Field::to_string).collect();
            return Ok(lines.join("\n"));
        }
        OutputFormat::Records => json::to_records(fields),
        OutputFormat::Collapsed => serde_json::Value::Object(json::collapse(fields)),
    };

    let rendered = if compact {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    };
    rendered.context("Failed to render JSON")
}

/// Write the payload to disk, refusing to clobber files unless forced
fn write_output_file(path: &Path, data: &[u8], force: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    if path.exists() && !force {
        bail!(
            "File already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    file.write_all(data)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}
