//! mafnexus — MAF annotation and merging.
//! Entry point for the command-line binary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use mafnexus_annotator::Annotator;
use mafnexus_config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mafnexus", version, about = "Annotate and merge MAF files")]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate a MAF file against the annotation service.
    Annotate(AnnotateArgs),
    /// Merge several MAF files into one.
    Merge(MergeArgs),
}

#[derive(Args)]
struct AnnotateArgs {
    /// Input MAF file.
    #[arg(long)]
    filename: PathBuf,

    /// Annotated output file.
    #[arg(long)]
    output_filename: PathBuf,

    /// Where to write the per-record failure report.
    #[arg(long)]
    error_report_location: Option<PathBuf>,

    /// Replace Hugo symbol and Entrez id with the canonical transcript's.
    #[arg(long)]
    replace_symbol_entrez: bool,

    #[arg(long)]
    isoform_override_source: Option<String>,

    /// Records per batched request; 0 sends one request per record.
    #[arg(long)]
    post_interval_size: Option<usize>,

    /// Abort when required columns are missing.
    #[arg(long)]
    strict_maf_checks: bool,

    /// Config file (TOML, or YAML by extension).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["input_mafs", "input_maf_directory", "input_maf_list"])
))]
struct MergeArgs {
    /// Comma-separated list of MAF files.
    #[arg(long, value_delimiter = ',')]
    input_mafs: Vec<PathBuf>,

    /// Directory whose files are all merged.
    #[arg(long)]
    input_maf_directory: Option<PathBuf>,

    /// File listing one MAF path per line.
    #[arg(long)]
    input_maf_list: Option<PathBuf>,

    #[arg(long)]
    output_maf: PathBuf,

    /// Drop files lacking the required columns.
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "mafnexus=debug,info" } else { "mafnexus=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            let path = path.to_string_lossy();
            let mut config = Config::from_path(&path)?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => Config::load()?,
    };
    Ok(config)
}

async fn run_annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let annotation = &mut config.annotation;
    if args.replace_symbol_entrez {
        annotation.replace_symbol_entrez = true;
    }
    if args.strict_maf_checks {
        annotation.strict_maf_checks = true;
    }
    if let Some(source) = args.isoform_override_source {
        annotation.isoform_override_source = source;
    }
    if let Some(size) = args.post_interval_size {
        annotation.post_interval_size = size;
    }

    let annotator = Annotator::from_config(&config.annotation)?;
    let result = annotator
        .annotate_file(&args.filename, &args.output_filename, args.error_report_location.as_deref())
        .await
        .with_context(|| format!("annotating {}", args.filename.display()))?;

    if result.counts.failed > 0 {
        warn!(failed = result.counts.failed, "Some records could not be annotated");
    }
    info!(output = %result.output_path.display(), duration_ms = result.duration_ms, "Done");
    Ok(())
}

fn run_merge(args: MergeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let strict = args.strict || config.merge.strict;

    let output = if let Some(dir) = &args.input_maf_directory {
        mafnexus_merge::merge_directory(dir, &args.output_maf, strict)?
    } else if let Some(list) = &args.input_maf_list {
        mafnexus_merge::merge_list_file(list, &args.output_maf, strict)?
    } else {
        mafnexus_merge::merge_files(&args.input_mafs, &args.output_maf, strict)?
    };
    info!(output = %output.display(), "Merged MAF written");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("mafnexus {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Annotate(args) => run_annotate(args).await,
        Command::Merge(args) => run_merge(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_merge_requires_one_input() {
        assert!(Cli::try_parse_from(["mafnexus", "merge", "--output-maf", "out.maf"]).is_err());
        let cli = Cli::try_parse_from(["mafnexus", "merge", "--input-mafs", "a.maf,b.maf", "--output-maf", "out.maf"]).unwrap();
        match cli.command {
            Command::Merge(args) => assert_eq!(args.input_mafs.len(), 2),
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn test_annotate_flags() {
        let cli = Cli::try_parse_from([
            "mafnexus", "annotate", "--filename", "in.maf", "--output-filename", "out.maf",
            "--post-interval-size", "50", "--replace-symbol-entrez", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Annotate(args) => {
                assert_eq!(args.post_interval_size, Some(50));
                assert!(args.replace_symbol_entrez);
                assert!(args.error_report_location.is_none());
            }
            _ => panic!("expected annotate"),
        }
    }
}
