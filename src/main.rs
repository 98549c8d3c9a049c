use anyhow::{Context, Result};
use bundle_patcher::config::load_descriptors;
use bundle_patcher::{EngineError, Patch, PatchEngine, PatchOutcome, PatchRegistry, PatchStatus};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bundle-patcher")]
#[command(about = "Deterministic patch engine for minified JavaScript bundles", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output (also enabled by a non-empty DEBUG variable)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch a bundle and write the result, skipping work if unchanged
    Apply {
        /// Upstream bundle to read
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the patched bundle
        #[arg(short, long)]
        output: PathBuf,

        /// Extra patch set file, or a directory of *.toml patch sets
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Do not register the built-in patches
        #[arg(long)]
        no_builtin: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Run every patch in memory and report, without writing anything
    Check {
        /// Upstream bundle to read
        #[arg(short, long)]
        input: PathBuf,

        /// Extra patch set file, or a directory of *.toml patch sets
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Do not register the built-in patches
        #[arg(long)]
        no_builtin: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List registered patches in application order
    List {
        /// Extra patch set file, or a directory of *.toml patch sets
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Do not register the built-in patches
        #[arg(long)]
        no_builtin: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Apply {
            input,
            output,
            patches,
            no_builtin,
            json,
            diff,
        } => cmd_apply(&input, &output, patches, no_builtin, json, diff),

        Commands::Check {
            input,
            patches,
            no_builtin,
            diff,
        } => cmd_check(&input, patches, no_builtin, diff),

        Commands::List {
            patches,
            no_builtin,
        } => cmd_list(patches, no_builtin),
    }
}

fn init_logging(verbose: bool) {
    let debug_env = env::var("DEBUG").map(|v| !v.is_empty()).unwrap_or(false);
    let filter = if verbose || debug_env {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Built-ins first (unless disabled), then any loaded patch sets.
fn build_registry(patches: Option<PathBuf>, no_builtin: bool) -> Result<PatchRegistry> {
    let mut registry = if no_builtin {
        PatchRegistry::new()
    } else {
        PatchRegistry::builtin()
    };

    if let Some(path) = patches {
        let descriptors = load_descriptors(&path)?;
        registry.extend(descriptors)?;
    }

    if registry.is_empty() {
        anyhow::bail!("No patches registered: pass --patches or drop --no-builtin");
    }

    Ok(registry)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
    println!();
}

fn print_results(results: &[PatchOutcome]) {
    for outcome in results {
        let reason = outcome.reason.as_deref().unwrap_or_default();
        match outcome.status {
            PatchStatus::Ok => println!("{} {}: Applied", "✓".green(), outcome.id),
            PatchStatus::Skipped => {
                println!("{} {}: Skipped ({})", "⊘".cyan(), outcome.id, reason)
            }
            PatchStatus::Failed => {
                eprintln!("{} {}: Failed ({})", "✗".red(), outcome.id, reason)
            }
        }
    }
}

fn print_summary(results: &[PatchOutcome]) {
    let count = |status: PatchStatus| results.iter().filter(|r| r.status == status).count();

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", count(PatchStatus::Ok)).green());
    println!("  {} skipped", format!("{}", count(PatchStatus::Skipped)).cyan());
    println!("  {} failed", format!("{}", count(PatchStatus::Failed)).red());
}

fn report_fatal(error: &EngineError) -> ! {
    eprintln!("{} {}", "✗".red(), error);
    if let Some(guidance) = error.guidance() {
        eprintln!();
        for line in guidance.lines() {
            eprintln!("  {}", line.yellow());
        }
    }
    std::process::exit(1);
}

fn cmd_apply(
    input: &Path,
    output: &Path,
    patches: Option<PathBuf>,
    no_builtin: bool,
    json: bool,
    show_diff: bool,
) -> Result<()> {
    let engine = PatchEngine::new(build_registry(patches, no_builtin)?);

    if !json {
        println!("Input: {}", input.display());
        println!("Output: {}", output.display());
        println!();
    }

    let outcome = match engine.apply_file(input, output) {
        Ok(outcome) => outcome,
        Err(error) => report_fatal(&error),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.skipped_via_cache {
        println!(
            "{} Source unchanged since last run, output is up to date",
            "⊙".yellow()
        );
        return Ok(());
    }

    print_results(&outcome.results);

    if show_diff {
        let original = fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let patched = fs::read_to_string(output)
            .with_context(|| format!("Failed to read {}", output.display()))?;
        display_diff(output, &original, &patched);
    }

    print_summary(&outcome.results);
    Ok(())
}

fn cmd_check(
    input: &Path,
    patches: Option<PathBuf>,
    no_builtin: bool,
    show_diff: bool,
) -> Result<()> {
    let engine = PatchEngine::new(build_registry(patches, no_builtin)?);
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("Input: {}", input.display());
    println!("{}", "  [DRY RUN - nothing is written]".cyan());
    println!();

    let fold = engine.run(&source);
    print_results(&fold.results);

    if show_diff && fold.text != source {
        display_diff(input, &source, &fold.text);
    }

    print_summary(&fold.results);

    if !fold.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(patches: Option<PathBuf>, no_builtin: bool) -> Result<()> {
    let registry = build_registry(patches, no_builtin)?;

    for (idx, patch) in registry.iter().enumerate() {
        let flag = if patch.required() {
            "required".red()
        } else {
            "optional".dimmed()
        };
        println!("{:>2}. {} [{}]", idx + 1, patch.id().bold(), flag);
        if !patch.description().is_empty() {
            println!("    {}", patch.description());
        }
    }

    Ok(())
}
