//! Command-line interface for dataset preparation.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bundle::bundle_exports;
use crate::cas::{convert_files, list_exports};
use crate::config::{
    default_split_paths, SplitConfig, DEFAULT_BUNDLE_DIR, DEFAULT_DATASET_JSON,
    DEFAULT_DATASET_JSONL,
};
use crate::dataset::{read_dataset, write_artifacts, Artifact, Format};
use crate::error::Result;
use crate::split::{split_with_seed, PartitionStats, SplitSummary};

/// ClaimPT dataset preparation - bundle annotation exports, convert them to a
/// claim dataset and split it into train/test by document.
#[derive(Parser)]
#[command(name = "claimpt-prep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy the CAS JSON export of every sub-folder into one directory.
    Bundle {
        /// Directory holding one folder per annotated document
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Destination directory (default: <root>/jsons)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert bundled CAS JSON files into the claim dataset (JSON + JSONL).
    Convert {
        /// Directory containing the bundled CAS JSON files
        #[arg(long)]
        input_dir: PathBuf,

        /// Pretty JSON output (list of documents)
        #[arg(long, default_value = DEFAULT_DATASET_JSON)]
        output_json: PathBuf,

        /// JSONL output (one document per line)
        #[arg(long, default_value = DEFAULT_DATASET_JSONL)]
        output_jsonl: PathBuf,
    },

    /// Split a dataset into train and test files without document leakage.
    Split {
        /// Dataset file (JSON array or JSONL)
        #[arg(long)]
        input: PathBuf,

        /// Preserve the claim:non-claim document ratio in both partitions
        #[arg(long)]
        keep_ratio: bool,

        /// Seed for the document shuffle (default: 42)
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of documents in the train partition (default: 0.8)
        #[arg(long)]
        train_ratio: Option<f64>,

        /// Claim ratio a document must exceed to count as claim-bearing (default: 0.0)
        #[arg(long)]
        claim_threshold: Option<f64>,

        /// Train output (default: <input stem>_train.json)
        #[arg(long)]
        out_train: Option<PathBuf>,

        /// Test output (default: <input stem>_test.json)
        #[arg(long)]
        out_test: Option<PathBuf>,

        /// Also write JSONL copies next to the outputs
        #[arg(long)]
        jsonl: bool,
    },
}

/// Options of the split command, after parsing.
struct SplitArgs {
    input: PathBuf,
    keep_ratio: bool,
    seed: Option<u64>,
    train_ratio: Option<f64>,
    claim_threshold: Option<f64>,
    out_train: Option<PathBuf>,
    out_test: Option<PathBuf>,
    jsonl: bool,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bundle { root, output } => bundle_command(&root, output.as_deref()),
        Commands::Convert {
            input_dir,
            output_json,
            output_jsonl,
        } => convert_command(&input_dir, &output_json, &output_jsonl),
        Commands::Split {
            input,
            keep_ratio,
            seed,
            train_ratio,
            claim_threshold,
            out_train,
            out_test,
            jsonl,
        } => split_command(SplitArgs {
            input,
            keep_ratio,
            seed,
            train_ratio,
            claim_threshold,
            out_train,
            out_test,
            jsonl,
        }),
    }
}

/// Execute the bundle command.
fn bundle_command(root: &Path, output: Option<&Path>) -> Result<()> {
    let output = output.map_or_else(|| root.join(DEFAULT_BUNDLE_DIR), Path::to_path_buf);

    let report = bundle_exports(root, &output)?;

    for (source, destination) in &report.copied {
        println!(
            "{} {} -> {}",
            style("[OK]").green(),
            source.display(),
            destination.display()
        );
    }
    for folder in &report.ambiguous {
        println!(
            "{} Multiple JSON files in {}, used the first",
            style("[WARN]").yellow(),
            folder.display()
        );
    }
    for folder in &report.overwritten {
        println!(
            "{} {} has the same bundled name as an earlier folder and replaced its file",
            style("[WARN]").yellow(),
            folder.display()
        );
    }
    for folder in &report.skipped {
        println!(
            "{} No JSON file found in {}, skipped",
            style("[WARN]").yellow(),
            folder.display()
        );
    }

    println!();
    println!(
        "{} {} file(s) bundled into {}",
        style("Done:").green().bold(),
        report.copied.len(),
        output.display()
    );
    Ok(())
}

/// Execute the convert command.
fn convert_command(input_dir: &Path, output_json: &Path, output_jsonl: &Path) -> Result<()> {
    let files = list_exports(input_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let documents = match convert_files(&files, |_, document| {
        pb.set_message(document.document.clone());
        pb.inc(1);
    }) {
        Ok(documents) => documents,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    let items: usize = documents.iter().map(|d| d.items.len()).sum();
    let claims: usize = documents
        .iter()
        .flat_map(|d| &d.items)
        .filter(|i| i.claim)
        .count();

    write_artifacts(&[
        Artifact::render_as(output_json, &documents, Format::Json)?,
        Artifact::render_as(output_jsonl, &documents, Format::Jsonl)?,
    ])?;

    println!(
        "{} {} documents ({} items, {} claims)",
        style("Converted").bold(),
        style(documents.len()).cyan(),
        items,
        claims
    );
    println!("  - {}", output_json.display());
    println!("  - {}", output_jsonl.display());
    Ok(())
}

/// Execute the split command.
fn split_command(args: SplitArgs) -> Result<()> {
    // Flags override the environment, which overrides the defaults
    let mut config = SplitConfig::from_env();
    if args.keep_ratio {
        config = config.with_keep_ratio(true);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(ratio) = args.train_ratio {
        config = config.with_train_ratio(ratio);
    }
    if let Some(threshold) = args.claim_threshold {
        config = config.with_claim_threshold(threshold);
    }

    // Reject bad parameters before reading anything
    config.validate()?;

    let records = read_dataset(&args.input)?;
    let outcome = split_with_seed(records, &config)?;

    let (default_train, default_test) =
        default_split_paths(&args.input, Format::Json.extension());
    let train_path = args.out_train.unwrap_or(default_train);
    let test_path = args.out_test.unwrap_or(default_test);

    let mut artifacts = vec![
        Artifact::render(&train_path, &outcome.train)?,
        Artifact::render(&test_path, &outcome.test)?,
    ];
    if args.jsonl {
        // An output that is already JSONL needs no twin
        for (path, records) in [(&train_path, &outcome.train), (&test_path, &outcome.test)] {
            if Format::from_path(path) == Format::Json {
                artifacts.push(Artifact::render_as(
                    path.with_extension(Format::Jsonl.extension()),
                    records,
                    Format::Jsonl,
                )?);
            }
        }
    }

    write_artifacts(&artifacts)?;

    print_summary(&outcome.summary, config.seed, outcome.fallback.is_some());
    println!();
    println!("{}", style("Wrote:").green().bold());
    for artifact in &artifacts {
        println!("  {}", artifact.path.display());
    }
    Ok(())
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "inf".to_string(), |r| format!("{r:.3}"))
}

fn print_stats_line(name: &str, stats: &PartitionStats) {
    println!(
        "  {:<7} {:>6} docs  {:>7} claims  {:>7} non-claims  NC:C {:>7}  claim docs {:.3}",
        name,
        stats.documents,
        stats.counts.claims,
        stats.counts.non_claims,
        format_ratio(stats.counts.non_claim_per_claim()),
        stats.claim_document_ratio(),
    );
}

/// The fallback reason itself is logged by the splitter; the summary only
/// notes that one happened.
fn print_summary(summary: &SplitSummary, seed: u64, fell_back: bool) {
    let mode = match (summary.stratified, fell_back) {
        (true, _) => "stratified",
        (false, true) => "unstratified, stratification fell back",
        (false, false) => "unstratified",
    };
    println!("{} ({mode}, seed {seed})", style("Split summary").bold());
    print_stats_line("corpus", &summary.corpus);
    print_stats_line("train", &summary.train);
    print_stats_line("test", &summary.test);
}
