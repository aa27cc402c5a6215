// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for xmldoc2md.
//!
//! This binary provides the `xmldoc2md` command for converting XML
//! documentation comment files to Markdown format.

use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each file to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    concat: bool,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("no XML input files found"))]
    NoInputFiles,

    #[snafu(display("cannot output multiple files to stdout without --concat"))]
    MultipleFilesToStdout,

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to convert {}: {source}", path.display()))]
    ConvertFile {
        path: PathBuf,
        source: xmldoc2md::ConvertError,
    },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert XML documentation comment files to Markdown

Usage: {name} [OPTIONS] <INPUT>...

Arguments:
  <INPUT>...  Input XML files or directories containing them

Options:
  -o, --output <OUTPUT>     Output directory (or file with --concat, or - for stdout)
                            Defaults to stdout
      --concat              Combine all inputs into a single output

Other options:
  -q, --quiet               Suppress progress messages
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output = OutputTarget::Stdout;
    let mut concat = false;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                };
            }
            Long("concat") => concat = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output,
        concat,
        quiet,
        dry_run,
        force,
    })
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    // Collect all input files first
    let files = collect_input_files(&cli.input);
    ensure!(!files.is_empty(), NoInputFilesSnafu);

    if cli.concat {
        process_concat(&files, &cli)?;
    } else {
        match &cli.output {
            OutputTarget::Stdout => {
                // Without concat, we can only output one file to stdout
                ensure!(files.len() == 1, MultipleFilesToStdoutSnafu);
                process_to_stdout(&files[0], &cli)?;
            }
            OutputTarget::Directory(dir) => {
                if !cli.dry_run {
                    std::fs::create_dir_all(dir).context(CreateOutputDirSnafu)?;
                }
                for file in &files {
                    process_file(file, dir, &cli)?;
                }
            }
        }
    }

    Ok(())
}

/// Collects all XML files from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "xml"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Reads an input file and converts it to Markdown.
fn convert_file(path: &Path) -> Result<String, Error> {
    let xml = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
    xmldoc2md::convert(&xml).context(ConvertFileSnafu { path })
}

/// Processes a single file and outputs to stdout.
fn process_to_stdout(input: &Path, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        eprintln!("Would output {}", input.display());
        return Ok(());
    }

    let markdown = convert_file(input)?;
    println!("{markdown}");
    Ok(())
}

/// Processes multiple files and concatenates them into a single output.
fn process_concat(files: &[PathBuf], cli: &Cli) -> Result<(), Error> {
    let mut output = String::new();

    for (i, path) in files.iter().enumerate() {
        if i > 0 {
            output.push_str("\n---\n\n");
        }
        output.push_str(&convert_file(path)?);
    }

    match &cli.output {
        OutputTarget::Stdout => {
            if cli.dry_run {
                eprintln!("Would output {} files concatenated", files.len());
            } else {
                println!("{output}");
            }
        }
        OutputTarget::Directory(path) => {
            // In concat mode, treat path as a file, not directory
            if cli.dry_run {
                eprintln!(
                    "Would write {} ({} files concatenated)",
                    path.display(),
                    files.len()
                );
            } else if path.exists() && !cli.force {
                if !cli.quiet {
                    eprintln!(
                        "Skipping {} (already exists, use --force to overwrite)",
                        path.display()
                    );
                }
            } else {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).context(CreateOutputDirSnafu)?;
                }
                std::fs::write(path, &output).context(WriteFileSnafu { path })?;
                if !cli.quiet {
                    eprintln!("Wrote {} ({} files)", path.display(), files.len());
                }
            }
        }
    }

    Ok(())
}

/// Processes a single file and writes to the output directory.
fn process_file(input: &Path, out_dir: &Path, cli: &Cli) -> Result<(), Error> {
    let out_name = input.file_stem().context(InvalidFilenameSnafu)?;
    let out_path = out_dir.join(format!("{}.md", out_name.to_string_lossy()));

    if cli.dry_run {
        eprintln!("Would write {}", out_path.display());
        return Ok(());
    }

    if out_path.exists() && !cli.force {
        if !cli.quiet {
            eprintln!(
                "Skipping {} (already exists, use --force to overwrite)",
                out_path.display()
            );
        }
        return Ok(());
    }

    let markdown = convert_file(input)?;
    std::fs::write(&out_path, &markdown).context(WriteFileSnafu { path: &out_path })?;

    if !cli.quiet {
        eprintln!("Wrote {}", out_path.display());
    }
    Ok(())
}
