use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.planetarypy.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Tsv,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the expanded columns and byte ranges declared by a label
    Columns {
        /// Path to the label file
        label: PathBuf,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read the index table paired with a label
    Read {
        /// Path to the label file
        label: PathBuf,

        /// Keep time columns as text
        #[arg(long)]
        raw_times: bool,

        /// Only print the first N rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tsv)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode one line of table data with a label
    DecodeLine {
        /// Path to the label file
        label: PathBuf,

        /// One line of the .tab data file
        line: String,
    },

    /// Stack every .tab file in a folder into one JSON table
    Collect {
        /// Folder holding the index files
        dir: PathBuf,

        /// Label describing all of them
        label: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fix the HiRISE EDRCUMINDEX exposure duration bug; reads INFILE, writes OUTFILE
    FixHiriseIndex {
        infile: PathBuf,
        outfile: PathBuf,
    },

    /// Convert a day-of-year date (2016-045) to ISO
    NasaDateToIso { datestr: String },

    /// Convert an ISO date (2016-02-14) to day-of-year form
    IsoToNasaDate { datestr: String },

    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Store the folder where index data is archived
    SetDataRoot { path: PathBuf },
}
