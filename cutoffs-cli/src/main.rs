use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

// Import from cutoffs-core
use cutoffs_core::{CutoffProcessor, ParseResult, ParsingConfig};

// Import CLI utilities
use cutoffs::{default_cache_dir, init_tracing};

#[derive(Parser)]
#[command(name = "cutoffs")]
#[command(about = "Recover college/branch cutoff tables from seat-allotment reports")]
struct Args {
    /// Path to the cutoff report (PDF, or already-extracted .txt)
    #[arg(short, long, default_value = "cutoff.pdf")]
    input: String,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Skip cache and force fresh processing (useful for development/testing)
    #[arg(long)]
    skip_cache: bool,

    /// Directory for cached parse results (default: ~/.cache/cutoffs)
    #[arg(long)]
    cache_dir: Option<String>,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("🦀 Cutoff Report Parser");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    // Check if input file exists
    let input = Path::new(&args.input);
    if !input.exists() {
        println!("⚠️  Input report not found at: {}", args.input);
        println!("   Please check the file path.");
        std::process::exit(1);
    }

    let config = ParsingConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }

    let cache_dir = match &args.cache_dir {
        Some(dir) => Some(PathBuf::from(dir)),
        None => default_cache_dir().ok(),
    };
    let processor = CutoffProcessor::new_cli(input, cache_dir.as_deref(), config)?;
    println!("🚀 Using {}", processor.source_name());

    println!("📄 Processing: {}", args.input);
    let result = match processor.process_file_with_profiling(input, args.profile, args.skip_cache) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("❌ Processing failed: {e:#}");
            std::process::exit(1);
        }
    };

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    save_result(&result, &output_path)?;

    if !result.success {
        eprintln!(
            "❌ Parsing failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    println!("✅ Successfully parsed report");
    print_summary(&result);
    Ok(())
}

/// `<input stem>_cutoffs.json` next to the working directory
fn default_output_path(input: &str) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{input_name}_cutoffs.json")
}

fn save_result(result: &ParseResult, output_path: &str) -> Result<()> {
    result.save_to_json(output_path)?;
    println!("💾 Results saved to: {}", output_path);
    Ok(())
}

fn print_summary(result: &ParseResult) {
    println!("📊 Parse metrics:");
    println!("   - Colleges: {}", result.totals.college_count);
    println!("   - Branches: {}", result.totals.branch_count);
    println!("   - Cutoffs: {}", result.totals.cutoff_count);

    let diagnostics = &result.diagnostics;
    if !diagnostics.is_clean() {
        println!("⚠️  {} parse warnings:", diagnostics.warnings.len());
        println!("   - Overflow pairs dropped: {}", diagnostics.overflow_pairs);
        println!("   - Orphan percentiles dropped: {}", diagnostics.dropped_orphan_percentiles);
        println!("   - Unpaired ranks dropped: {}", diagnostics.dropped_unpaired_ranks);
        println!("   - Invalid tokens dropped: {}", diagnostics.invalid_tokens);
        println!("   - Colleges skipped: {}", diagnostics.skipped_colleges);
    }
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --config <path>         Load custom config file");
    println!("  --input <path>          Report to process (.pdf or .txt)");
    println!("  --output <path>         Output file path (auto-generated if not specified)");
    println!("  --cache-dir <path>      Result cache directory (default: ~/.cache/cutoffs)");
    println!("  --skip-cache            Always re-parse, never read or write the cache");
    println!("  --profile               Print per-step timings");

    println!("\n📁 Config keys (YAML, all optional):");
    println!("  headers.college_code_digits   Digits in a college code (default 5)");
    println!("  headers.branch_code_digits    Digits in a branch code (default 10)");
    println!("  table.anchor_phrase           Line that precedes the category row (default \"State Level\")");
    println!("  table.category_lookahead      Lines searched for the category row (default 4)");
    println!("  stages.stage_lookahead        Lines scanned per stage block (default 20)");
    println!("  stages.rank_min_digits        Shortest accepted rank (default 3)");

    println!("\n📁 Example config file: ./configs/default.yaml (every key at its default)");

    println!("\n📝 Usage Examples:");
    println!("  cargo run -- -i cutoff.pdf");
    println!("  cargo run -- -i cutoff.pdf -o /path/to/output.json");
    println!("  cargo run -- -i extracted.txt -c config.yaml --skip-cache");
    println!("  cargo run --bin cutoffs-migrate -- cutoff.pdf 2024");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path("reports/cutoff.pdf"), "cutoff_cutoffs.json");
        assert_eq!(default_output_path(""), "output_cutoffs.json");
    }
}
