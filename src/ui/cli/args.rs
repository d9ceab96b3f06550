// Mon Oct 19 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memory-size-layout")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "C/C++ type size, alignment and member layout calculator", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Raise verbosity; overrides --log-level when given.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json_output: bool,

    /// JSON configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// ABI preset or alias; overrides the configured profile.
    #[arg(short, long, global = true)]
    pub profile: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lay out each type expression against a declaration unit.
    Query(QueryArgs),
    /// Lay out every named aggregate in a declaration unit.
    Dump(DumpArgs),
    /// Print fundamental size/alignment tables.
    Profiles(ProfilesArgs),
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Declaration unit in JSON form.
    pub unit: PathBuf,

    #[arg(required = true)]
    pub types: Vec<String>,

    #[arg(long)]
    pub hide_padding: bool,
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    pub unit: PathBuf,

    #[arg(long)]
    pub hide_padding: bool,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    /// Only these presets; defaults to the active profile when one is configured.
    pub names: Vec<String>,
}

impl QueryArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.unit.exists() {
            return Err(format!("Unit file does not exist: {:?}", self.unit));
        }
        if self.types.iter().any(|t| t.trim().is_empty()) {
            return Err("Type expressions must not be empty".to_string());
        }
        Ok(())
    }
}

impl DumpArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.unit.exists() {
            return Err(format!("Unit file does not exist: {:?}", self.unit));
        }
        Ok(())
    }
}
