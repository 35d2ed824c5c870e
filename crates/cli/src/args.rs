//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for merinfo
#[derive(Parser, Debug)]
#[command(name = "merinfo")]
#[command(author, version, about = "Look up people on merinfo.se by name and city")]
#[command(long_about = r#"
Searches merinfo.se for a first name, last name and city and prints the
people found. Result pages are cached in a local SQLite file, so repeating
a search does not hit the site again.

Configuration is read from (highest priority first):
1. MERINFO_* environment variables (e.g. MERINFO_TIMEOUT_MS=5000)
2. --config <path> or MERINFO_CONFIG_FILE
3. Built-in defaults

Example:
  merinfo -f Anna -l Svensson -c Stockholm
  merinfo -f Anna -l Svensson -c Stockholm --refresh --json
"#)]
pub struct Cli {
    /// First name to search for
    #[arg(short, long, value_name = "NAME")]
    pub first_name: String,

    /// Last name to search for
    #[arg(short, long, value_name = "NAME")]
    pub last_name: String,

    /// City to search in
    #[arg(short, long)]
    pub city: String,

    /// Bypass the response cache entirely
    #[arg(long, conflicts_with = "refresh")]
    pub no_cache: bool,

    /// Ignore any cached page for this search and overwrite it
    #[arg(long)]
    pub refresh: bool,

    /// Delete all cached responses before searching
    #[arg(long)]
    pub clear_cache: bool,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,

    /// Also save the JSON report to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
}
