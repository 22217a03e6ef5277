use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser};
use ec2g_site::config::SiteConfig;
use ec2g_site::{logging, validator};

/// Check the website tree for required files and superficially well-formed assets.
#[derive(Debug, Parser)]
#[command(author, version, about = "Validate the EC2G website structure before deployment", long_about = None)]
struct Args {
    /// Site root. Defaults to the current directory.
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Optional config whose `[validator]` section replaces the default manifest.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Plain output without ANSI colors.
    #[arg(long, action = ArgAction::SetTrue)]
    no_color: bool,
}

fn main() -> ExitCode {
    logging::init(false);
    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let config = SiteConfig::load(args.config.as_deref())?;
    let report = validator::validate(&args.root, &config.validator);
    report.print(&mut std::io::stdout().lock(), !args.no_color)?;
    Ok(report.passed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_current_directory() {
        let args = Args::parse_from(["ec2g-validate"]);
        assert_eq!(args.root, PathBuf::from("."));
        assert!(!args.no_color);
    }

    #[test]
    fn missing_tree_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let args = Args::parse_from(["ec2g-validate", "--no-color", "--root", tmp.path().to_str().unwrap()]);
        assert!(!run(args).unwrap());
    }
}
