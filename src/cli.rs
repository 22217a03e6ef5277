use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tools for the EC2G group website
#[derive(Parser)]
#[command(name = "ec2g")]
#[command(version, about = "Content, widgets and build checks for the EC2G website", long_about = None)]
pub struct Cli {
    /// Site config (defaults to ./ec2g.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content record JSON (defaults to the bundled record)
    #[arg(long, global = true, value_name = "FILE")]
    pub content: Option<PathBuf>,

    /// Verbose logging; RUST_LOG is honoured
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the most recent news, as the carousel shows them
    News {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Run the event countdown in the terminal
    Countdown {
        /// Target date-time (RFC 3339, or local ISO date-time)
        #[arg(long)]
        target: Option<String>,
    },
    /// Fetch a researcher's latest journal articles from ORCID
    Publications {
        /// ORCID iD, e.g. 0000-0002-5037-0961
        orcid: String,
    },
    /// Inject header/footer into a page and boot its widgets
    Render {
        page: PathBuf,
        /// Write the page with templates injected
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check a site tree for required files and well-formed assets
    Validate {
        #[arg(long, default_value = ".")]
        root: PathBuf,
        #[arg(long)]
        no_color: bool,
    },
    /// Summarise a content record
    Content,
}
