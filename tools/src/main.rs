use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::Limits;
use emevd_tools::{
    decode_document_json, format_decode_pretty, inspect_document, parse_schema, roundtrip,
    InspectReport,
};
use glob::Pattern;
use schema::{schema_hash, InstructionSchema};

#[derive(Parser)]
#[command(
    name = "emevd-tools",
    version,
    about = "emevd inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect header fields and table layout.
    Inspect {
        /// Path to an event-script file or a directory of them.
        path: PathBuf,
        /// Glob matched against file names when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected files.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Inspect at most this many files, after sorting.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode a file into structured JSON.
    Decode {
        /// Path to the event-script file.
        path: PathBuf,
        /// Instruction schema JSON for the file's variant.
        #[arg(long)]
        schema: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Decode and re-encode a file, reporting whether the bytes match.
    Roundtrip {
        /// Path to the event-script file.
        path: PathBuf,
        /// Instruction schema JSON for the file's variant.
        #[arg(long)]
        schema: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));
    let cli = Cli::parse();
    let limits = Limits::default();
    match cli.command {
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
        } => {
            if path.is_dir() {
                for (file, size) in list_dir(&path, glob.as_deref(), sort, limit)? {
                    println!("== {} ({size} bytes) ==", file.display());
                    match inspect_document(&read_file(&file)?, &limits) {
                        Ok(report) => print_inspect_report(&report),
                        Err(err) => println!("error: {err}"),
                    }
                }
            } else {
                let report = inspect_document(&read_file(&path)?, &limits)?;
                print_inspect_report(&report);
            }
        }
        Command::Decode {
            path,
            schema,
            format,
        } => {
            let bytes = read_file(&path)?;
            let schema = load_schema(&schema)?;
            let output = decode_document_json(&bytes, &schema, &limits)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Roundtrip { path, schema } => {
            let bytes = read_file(&path)?;
            let schema = load_schema(&schema)?;
            let report = roundtrip(&bytes, &schema, &limits)?;
            println!(
                "input: {} bytes, output: {} bytes",
                report.input_len, report.output_len
            );
            match report.first_difference {
                None => println!("identical"),
                Some(offset) => bail!("output differs from input at byte 0x{offset:X}"),
            }
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn load_schema(path: &Path) -> Result<InstructionSchema> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    let schema = parse_schema(&contents)?;
    log::debug!(
        "loaded schema {} ({} instructions, hash 0x{:016x})",
        path.display(),
        schema.len(),
        schema_hash(&schema)
    );
    Ok(schema)
}

/// Lists the files of `dir` whose names match `filter`, ordered by path or
/// by descending size.
fn list_dir(
    dir: &Path,
    filter: Option<&str>,
    sort: Option<InspectSort>,
    limit: Option<usize>,
) -> Result<Vec<(PathBuf, u64)>> {
    let filter = filter
        .map(Pattern::new)
        .transpose()
        .context("invalid glob pattern")?;
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let path = entry.path();
        let selected = filter.as_ref().map_or(true, |pattern| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name))
        });
        if metadata.is_file() && selected {
            files.push((path, metadata.len()));
        }
    }
    match sort {
        Some(InspectSort::Size) => files.sort_by_key(|(path, size)| (Reverse(*size), path.clone())),
        None => files.sort(),
    }
    files.truncate(limit.unwrap_or(usize::MAX));
    Ok(files)
}

fn print_inspect_report(report: &InspectReport) {
    let header = report.header;
    println!(
        "variant: {:?} ({}-bit words) file_size: {} bytes",
        header.variant,
        header.variant.width().bits(),
        header.file_size
    );
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    println!("sections:");
    for section in &report.sections {
        let count = section
            .count
            .map_or_else(|| "pool".to_string(), |count| format!("{count} records"));
        println!(
            "  {:<13} @ 0x{:08X}: {count} ({} bytes)",
            section.name, section.offset, section.byte_len
        );
    }
}
