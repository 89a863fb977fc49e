use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wcc")]
#[command(about = "Component stylesheet generator for design-token CSS")]
pub struct Cli {
    /// Upstream layout file (YAML); defaults are used when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Upstream style package directory, overriding the layout
    #[arg(long, global = true)]
    pub package_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Parser, Debug)]
pub enum Commands {
    /// Generate `X.css` and `X.root.css` for every `X.wcc.yaml`
    Build {
        /// Transformation specs; discovered under --root when empty
        specs: Vec<PathBuf>,
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Write the resolved token map as JSON
    Tokens {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
