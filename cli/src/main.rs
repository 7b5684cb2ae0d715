//! pptslim CLI - PowerPoint presentation size optimizer
//!
//! A command-line tool for shrinking PPTX files by recompressing the
//! images embedded in them.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use pptslim::{
    default_output_path, package_summary, rewrite_package, CancelToken, CompressionReport,
    QualityProfile, RunOutcome, Tier,
};
use std::path::PathBuf;

/// Shrink PowerPoint presentations by recompressing embedded images
#[derive(Parser)]
#[command(
    name = "pptslim",
    version,
    about = "Shrink PowerPoint presentations",
    long_about = "pptslim - lossy size optimizer for PowerPoint presentations.\n\n\
                  Rewrites a PPTX package, re-encoding images under ppt/media/ at a\n\
                  chosen quality tier. Every other part is copied through untouched."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a presentation
    #[command(visible_alias = "c")]
    Compress {
        /// Input .pptx file
        input: PathBuf,

        /// Output file path (default: {stem}_{tag}压缩.pptx next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression tier
        #[arg(short, long, default_value = "high-quality")]
        tier: TierArg,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show package information (entries, recompressible media)
    Info {
        /// Input .pptx file
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available compression tiers
    Tiers,

    /// Show version information
    Version,
}

/// Compression tier selection
#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    /// 2048px / quality 85 - near-lossless
    HighQuality,
    /// 1600px / quality 75 - good for sharing
    Balanced,
    /// 1280px / quality 60 - phone-screen fidelity
    Strong,
    /// 1024px / quality 50 - smallest output
    Extreme,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::HighQuality => Tier::HighQuality,
            TierArg::Balanced => Tier::Balanced,
            TierArg::Strong => Tier::Strong,
            TierArg::Extreme => Tier::Extreme,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Compress {
            input,
            output,
            tier,
            json,
        } => {
            let profile = Tier::from(tier).profile();
            let output = output.unwrap_or_else(|| default_output_path(&input, &profile));

            if !pptslim::is_presentation_package(&input)? {
                eprintln!(
                    "{} input does not look like a presentation, compressing anyway",
                    "!".yellow().bold()
                );
            }

            let report = compress_with_progress(&input, &output, &profile)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} {} -> {}",
                    "✓".green().bold(),
                    input.display(),
                    report.output_path.display()
                );
                println!(
                    "  {}: {} -> {} ({:.1}% smaller)",
                    "Size".bold(),
                    format_bytes(report.input_bytes),
                    format_bytes(report.output_bytes),
                    report.reduction_percent()
                );
                println!(
                    "  {}: {} of {} media entries recompressed",
                    "Media".bold(),
                    report.stats.media_recompressed,
                    report.stats.media_candidates
                );
            }
        }

        Commands::Info { input, json } => {
            let summary = package_summary(&input)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", "Package Information".cyan().bold());
                println!("{}", "─".repeat(40));
                println!(
                    "{}: {}",
                    "File".bold(),
                    input.file_name().unwrap_or_default().to_string_lossy()
                );
                println!("{}: {}", "Size".bold(), format_bytes(summary.package_bytes));
                println!("{}: {}", "Entries".bold(), summary.entries_total);
                println!(
                    "{}: {} ({} uncompressed)",
                    "Media candidates".bold(),
                    summary.media_candidates,
                    format_bytes(summary.media_bytes)
                );
                if !summary.is_presentation {
                    println!(
                        "\n{} not a PowerPoint package (no ppt/ part tree)",
                        "!".yellow().bold()
                    );
                }
            }
        }

        Commands::Tiers => {
            println!("{}", "Compression Tiers".cyan().bold());
            println!("{}", "─".repeat(40));
            for tier in Tier::ALL {
                let profile = tier.profile();
                println!(
                    "{:<14} max width {:>4}px, quality {:>3}, output tag {}",
                    tier.name().bold(),
                    profile.max_width,
                    profile.quality,
                    profile.tag()
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn compress_with_progress(
    input: &PathBuf,
    output: &PathBuf,
    profile: &QualityProfile,
) -> Result<CompressionReport, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );

    let outcome = rewrite_package(
        input,
        output,
        profile,
        &CancelToken::new(),
        |done, total, name| {
            if pb.length() == Some(0) {
                pb.set_length(total as u64);
            }
            pb.set_position(done as u64);
            pb.set_message(truncate_name(name));
        },
    )?;

    pb.finish_and_clear();

    match outcome {
        RunOutcome::Completed(stats) => {
            let input_bytes = std::fs::metadata(input)?.len();
            let output_bytes = std::fs::metadata(output)?.len();
            Ok(CompressionReport {
                output_path: output.clone(),
                input_bytes,
                output_bytes,
                stats,
            })
        }
        RunOutcome::Cancelled => Err("compression cancelled".into()),
    }
}

/// Keep progress lines short: long media paths are tail-truncated.
fn truncate_name(name: &str) -> String {
    const MAX: usize = 32;
    if name.chars().count() <= MAX {
        name.to_string()
    } else {
        let tail: String = name
            .chars()
            .rev()
            .take(MAX)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}

fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

fn print_version() {
    println!("{} {}", "pptslim".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Lossy size optimizer for PowerPoint presentations");
    println!();
    println!("Tiers: high-quality, balanced, strong, extreme");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short.png"), "short.png");
        let long = "ppt/media/a_very_long_image_file_name_indeed_12345.png";
        let short = truncate_name(long);
        assert!(short.starts_with("..."));
        assert!(short.len() < long.len());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
