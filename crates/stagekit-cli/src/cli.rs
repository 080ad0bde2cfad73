use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(
    name = "stagekit",
    about = "stagekit: staged changesets between ordered collections",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// TOML file with diff defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the staged changeset between two JSON collections
    Diff(DiffArgs),
    /// Apply every stage to the source and check it reaches the target
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Treat both documents as lists of sections
    #[arg(long)]
    pub sectioned: bool,
    /// Section index stamped on flat element paths (flat documents only)
    #[arg(long)]
    pub section: Option<usize>,
    /// Print the raw delete/insert/update/move sets of a flat diff instead
    /// of its stages
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Treat both documents as lists of sections
    #[arg(long)]
    pub sectioned: bool,
}
