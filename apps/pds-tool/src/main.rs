//! CLI tool for inspecting and converting PDS index tables.
//!
//! Provides commands for:
//! - Listing the column layout of a label
//! - Reading, decoding and stacking index tables
//! - Repairing the HiRISE EDR index and converting NASA dates

mod cli;
mod output;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use pds_index_core::repair::fix_hirise_edrcumindex;
use pds_index_core::table::read_index_collection;
use pds_index_core::{time, IndexConfig, IndexLabel};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigAction, OutputFormat};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn load_label(path: &Path) -> anyhow::Result<IndexLabel> {
    IndexLabel::load(path).with_context(|| format!("Failed to load label {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path: PathBuf = cli.config.clone().unwrap_or_else(IndexConfig::default_path);
    let config = IndexConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    match cli.command {
        Commands::Columns { label, json } => {
            let label = load_label(&label)?;
            let mut out = open_output(None)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &label.column_specs())?;
                writeln!(out)?;
            } else {
                output::write_columns(&mut out, &label)?;
            }
            out.flush()?;
        }
        Commands::Read {
            label,
            raw_times,
            limit,
            format,
            output: output_path,
        } => {
            let label = load_label(&label)?;
            let mut options = config.read_options();
            if raw_times {
                options.normalize_times = false;
            }
            let table = label
                .read_table(&options)
                .with_context(|| format!("Failed to read {}", label.data_file_path().display()))?;
            tracing::info!("Read {} rows", table.n_rows());

            let mut out = open_output(output_path.as_deref())?;
            match format {
                OutputFormat::Tsv => output::write_tsv(&mut out, &table, limit)?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &table.records(limit))?;
                    writeln!(out)?;
                }
            }
            out.flush()?;
        }
        Commands::DecodeLine { label, line } => {
            let label = load_label(&label)?;
            let mut out = open_output(None)?;
            output::write_decoded(&mut out, &label.decode_line(&line))?;
            out.flush()?;
        }
        Commands::Collect {
            dir,
            label,
            output: output_path,
        } => {
            let label = load_label(&label)?;
            let table = read_index_collection(&dir, &label, &config.read_options())
                .with_context(|| format!("Failed to read index files in {}", dir.display()))?;
            let mut out = open_output(output_path.as_deref())?;
            serde_json::to_writer_pretty(&mut out, &table)?;
            writeln!(out)?;
            out.flush()?;
        }
        Commands::FixHiriseIndex { infile, outfile } => {
            let repaired = fix_hirise_edrcumindex(&infile, &outfile)
                .with_context(|| format!("Failed to fix {}", infile.display()))?;
            println!("{}", infile.display());
            println!("{}", outfile.display());
            println!("Repaired {} lines", repaired);
        }
        Commands::NasaDateToIso { datestr } => {
            println!("{}", time::nasa_date_to_iso(&datestr)?);
        }
        Commands::IsoToNasaDate { datestr } => {
            println!("{}", time::iso_to_nasa_date(&datestr)?);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("# {}", config_path.display());
                print!("{}", config.to_toml()?);
            }
            ConfigAction::SetDataRoot { path } => {
                let updated = IndexConfig::set_data_root(&config_path, path)?;
                let root = updated.ensure_data_root()?;
                println!(
                    "Saved data root {} into {}",
                    root.display(),
                    config_path.display()
                );
            }
        },
    }

    Ok(())
}
