use clap::Parser;
use std::path::PathBuf;

/// Geocode or reverse-geocode one column of a CSV file
#[derive(Parser, Debug)]
#[command(name = "geocolumn")]
#[command(author = "4n6h4x0r")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Resolves addresses to coordinates and \"lat,lon\" pairs to addresses",
    long_about = None
)]
pub struct Args {
    /// CSV file with a header row
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Name of the column to resolve
    #[arg(short = 'c', long = "column", required_unless_present = "list_columns")]
    pub column: Option<String>,

    /// Print the column names of INPUT and exit
    #[arg(short = 'l', long = "list-columns")]
    pub list_columns: bool,

    /// File whose first line is the API key
    #[arg(short = 'k', long = "api-key-file", default_value = "api_key.txt")]
    pub api_key_file: PathBuf,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
