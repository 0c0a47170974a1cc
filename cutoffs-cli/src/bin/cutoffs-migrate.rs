use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use cutoffs::{current_admission_year, init_tracing};
use cutoffs_core::{CutoffParser, Migrator, ParsingConfig, SqliteStore, TextSourceImpl};

#[derive(Parser)]
#[command(name = "cutoffs-migrate")]
#[command(about = "Parse a cutoff report and update the colleges/courses/cutoffs database")]
struct Args {
    /// Path to the cutoff report (PDF, or already-extracted .txt)
    #[arg(default_value = "cutoff.pdf")]
    pdf_path: String,

    /// Admission year the cutoffs belong to (default: current cycle)
    year: Option<i32>,

    /// SQLite database to update (created if missing)
    #[arg(short, long, default_value = "cutoffs.db")]
    database: PathBuf,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let year = args.year.unwrap_or_else(current_admission_year);
    let banner = "=".repeat(80);
    println!("\n{banner}");
    println!("Cutoff Report to SQL Migration Tool");
    println!("{banner}");
    println!("Report: {}", args.pdf_path);
    println!("Year: {year}");
    println!("Database: {}", args.database.display());
    println!("{banner}\n");

    match run(&args, year) {
        Ok(()) => {
            println!("\n✅ Migration completed successfully!");
            println!("The database has been updated with new cutoff data.");
            println!("\n{banner}\n");
        }
        Err(e) => {
            tracing::error!("Error during migration: {e:#}");
            println!("\n❌ Migration failed. Check the logs for details.");
            println!("\n{banner}\n");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args, year: i32) -> Result<()> {
    let config = ParsingConfig::load_with_fallback(args.config.as_deref());
    let parser = CutoffParser::new(config)?;
    let store = SqliteStore::open(&args.database)?;

    let path = Path::new(&args.pdf_path);
    let source = TextSourceImpl::for_path(path);
    let mut migrator = Migrator::new(parser, store);
    let summary = migrator.migrate_source(&source, path, year)?;

    println!("📊 Migration summary:");
    println!("   - Colleges processed: {}", summary.colleges);
    println!("   - Branches processed: {}", summary.branches);
    println!(
        "   - Cutoffs written: {} ({} new, {} updated, {} unchanged)",
        summary.cutoffs_written(),
        summary.cutoffs_inserted,
        summary.cutoffs_updated,
        summary.cutoffs_unchanged
    );
    if summary.failed_colleges > 0 {
        println!("⚠️  Colleges rolled back: {}", summary.failed_colleges);
    }
    Ok(())
}
