use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "apics-texts",
    version,
    about = "Conversion and metadata extraction for atlas chapters and language surveys"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Convert(ConvertArgs),
    Parse(ParseArgs),
    Refs(RefsArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Family {
    Chapter,
    Survey,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chapter => "chapter",
            Self::Survey => "survey",
        }
    }

    pub fn root(self, data_root: &Path) -> PathBuf {
        data_root.join(self.as_str())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(long, value_enum)]
    pub family: Family,

    #[arg(long, default_value = "data/texts")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "soffice")]
    pub soffice_bin: String,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(long, value_enum)]
    pub family: Family,

    #[arg(long, default_value = "data/texts")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "")]
    pub in_name: String,

    #[arg(long)]
    pub corpus_db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RefsArgs {
    #[arg(long, value_enum)]
    pub family: Family,

    #[arg(long, default_value = "data/texts")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "")]
    pub in_name: String,

    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub similarity_threshold: u8,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
