use crate::cache::{ResultCacheKey, ResultCacheValue};
use crate::config::ParsingConfig;
use crate::error::CutoffError;
use crate::parser::CutoffParser;
use crate::sources::{TextSource, TextSourceImpl};
use crate::storage::{calculate_config_hash, calculate_input_hash, FileStorage, NoOpStorage, ResultStorage};
use crate::types::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Cache source tag for text handed to `process_text` directly
const TEXT_INPUT_SOURCE: &str = "text";

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        let total_secs = total.as_secs_f64().max(f64::EPSILON);

        for (step, duration) in &self.timings {
            let percentage = (duration.as_secs_f64() / total_secs) * 100.0;
            println!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Report file → cached or freshly extracted and parsed `ParseResult`
pub struct CutoffProcessor {
    source: Box<dyn TextSource>,
    storage: Box<dyn ResultStorage + Send + Sync>,
    parser: CutoffParser,
}

impl CutoffProcessor {
    /// Create CutoffProcessor with full dependency injection
    pub fn new_with_dependencies(
        source: Box<dyn TextSource>,
        storage: Box<dyn ResultStorage + Send + Sync>,
        parser: CutoffParser,
    ) -> Self {
        Self {
            source,
            storage,
            parser,
        }
    }

    /// Convenience constructor for CLI usage: source picked by extension,
    /// file cache when a cache directory is given
    pub fn new_cli(input_path: &Path, cache_dir: Option<&Path>, config: ParsingConfig) -> Result<Self> {
        let source = Box::new(TextSourceImpl::for_path(input_path));
        let storage: Box<dyn ResultStorage + Send + Sync> = match cache_dir {
            Some(dir) => Box::new(FileStorage::new(dir)?),
            None => Box::new(NoOpStorage::new()),
        };
        Ok(Self::new_with_dependencies(source, storage, CutoffParser::new(config)?))
    }

    pub fn parser(&self) -> &CutoffParser {
        &self.parser
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Simple processing with cache, no profiling
    pub fn process_file(&self, input_path: &Path) -> Result<ParseResult> {
        self.process_file_with_profiling(input_path, false, false)
    }

    /// Read the input, consult the result cache, and only on a miss extract
    /// and parse.
    ///
    /// Read and extraction failures come back as a failure `ParseResult` and
    /// are never cached; only cache key generation can fail the call itself.
    pub fn process_file_with_profiling(
        &self,
        input_path: &Path,
        enable_profiling: bool,
        skip_cache: bool,
    ) -> Result<ParseResult> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(enable_profiling);

        info!("📄 Processing report: {} ({})", input_path.display(), self.source.name());
        let read = profiler.time_step("1. Read Input", || {
            fs::read(input_path)
                .with_context(|| format!("Failed to read report file: {}", input_path.display()))
        });
        let bytes = match read {
            Ok(bytes) => bytes,
            Err(e) => return Ok(self.extraction_failure(e, &profiler)),
        };

        let cache_key = profiler.time_step("2. Cache Key Generation", || {
            self.cache_key(&bytes, self.source.name())
        })?;
        if let Some(cached) = self.lookup(&cache_key, &mut profiler, skip_cache) {
            profiler.print_summary();
            return Ok(cached);
        }

        let extracted = profiler.time_step("4. Text Extraction", || self.source.extract_from_bytes(&bytes));
        let text = match extracted {
            Ok(text) => text,
            Err(e) => return Ok(self.extraction_failure(e, &profiler)),
        };

        let result = profiler.time_step("5. Parsing", || self.parser.parse_text(&text));
        self.store(&cache_key, &result, &mut profiler, skip_cache, start_time);

        profiler.print_summary();
        info!(
            "⏱️  Total processing time: {:.0}ms",
            start_time.elapsed().as_millis()
        );
        Ok(result)
    }

    /// Parse already-extracted text through the result cache
    pub fn process_text(&self, text: &str, skip_cache: bool) -> Result<ParseResult> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(false);

        let cache_key = self.cache_key(text.as_bytes(), TEXT_INPUT_SOURCE)?;
        if let Some(cached) = self.lookup(&cache_key, &mut profiler, skip_cache) {
            return Ok(cached);
        }

        let result = self.parser.parse_text(text);
        self.store(&cache_key, &result, &mut profiler, skip_cache, start_time);
        Ok(result)
    }

    fn cache_key(&self, input: &[u8], source: &str) -> Result<ResultCacheKey> {
        let config_hash = calculate_config_hash(self.parser.config())?;
        Ok(ResultCacheKey::new(calculate_input_hash(input), source, config_hash))
    }

    fn lookup(
        &self,
        cache_key: &ResultCacheKey,
        profiler: &mut StepProfiler,
        skip_cache: bool,
    ) -> Option<ParseResult> {
        if skip_cache {
            info!("🚫 Skipping cache lookup (--skip-cache enabled)");
            return None;
        }

        match profiler.time_step("3. Cache Lookup", || self.storage.get_result(cache_key)) {
            Ok(Some(cached)) => {
                info!("🎯 Cache hit: Found parse result for input + config combination");
                Some(cached.result)
            }
            Ok(None) => None,
            // A corrupt cache entry is a miss; it is rewritten after parsing
            Err(e) => {
                warn!("Cache lookup failed: {e:#}");
                None
            }
        }
    }

    fn store(
        &self,
        cache_key: &ResultCacheKey,
        result: &ParseResult,
        profiler: &mut StepProfiler,
        skip_cache: bool,
        start_time: Instant,
    ) {
        if skip_cache {
            info!("🚫 Skipping cache storage (--skip-cache enabled)");
            return;
        }

        let stored = profiler.time_step("6. Cache Storage", || {
            let processing_time = start_time.elapsed().as_millis() as u64;
            let cache_value = ResultCacheValue::new(result.clone(), processing_time);
            self.storage.store_result(cache_key, &cache_value)
        });
        if let Err(e) = stored {
            warn!("Cache storage failed: {e:#}");
        }
    }

    fn extraction_failure(&self, error: anyhow::Error, profiler: &StepProfiler) -> ParseResult {
        warn!("Text extraction failed: {error:#}");
        profiler.print_summary();
        ParseResult::failure(&CutoffError::extraction(format!("{error:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::PlainTextSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const REPORT: &str = "01002 - Govt College, City\n0100219110 - Civil Engineering\nStatus: Government Autonomous\nState Level\nGOPENS GSCS\nI\n500 (90.1) 600 (85.3)\n";

    struct CountingStorage {
        inner: FileStorage,
        hits: Arc<AtomicUsize>,
    }

    impl ResultStorage for CountingStorage {
        fn get_result(&self, key: &ResultCacheKey) -> Result<Option<ResultCacheValue>> {
            let found = self.inner.get_result(key)?;
            if found.is_some() {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }
            Ok(found)
        }

        fn store_result(&self, key: &ResultCacheKey, value: &ResultCacheValue) -> Result<()> {
            self.inner.store_result(key, value)
        }
    }

    fn processor_with_hits(cache_dir: &Path) -> (CutoffProcessor, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let storage = CountingStorage {
            inner: FileStorage::new(cache_dir).unwrap(),
            hits: hits.clone(),
        };
        let processor = CutoffProcessor::new_with_dependencies(
            Box::new(PlainTextSource::new()),
            Box::new(storage),
            CutoffParser::default(),
        );
        (processor, hits)
    }

    #[test]
    fn test_second_run_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cutoff.txt");
        std::fs::write(&input, REPORT).unwrap();
        let (processor, hits) = processor_with_hits(&dir.path().join("cache"));

        let first = processor.process_file(&input).unwrap();
        let second = processor.process_file(&input).unwrap();

        assert!(first.success);
        assert_eq!(first.totals, second.totals);
        assert_eq!(second.colleges[0].branches[0].cutoffs[1].rank, 600);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_skip_cache_bypasses_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let (processor, hits) = processor_with_hits(&dir.path().join("cache"));

        processor.process_text(REPORT, false).unwrap();
        let result = processor.process_text(REPORT, true).unwrap();

        assert_eq!(result.totals.cutoff_count, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_input_is_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let processor =
            CutoffProcessor::new_cli(Path::new("missing.txt"), Some(&dir.path().join("cache")), ParsingConfig::default())
                .unwrap();

        let result = processor
            .process_file_with_profiling(&dir.path().join("missing.txt"), true, false)
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Could not extract text from PDF"));
    }

    struct CountingSource {
        extractions: Arc<AtomicUsize>,
    }

    impl TextSource for CountingSource {
        fn extract_from_bytes(&self, bytes: &[u8]) -> Result<String> {
            self.extractions.fetch_add(1, Ordering::SeqCst);
            PlainTextSource::new().extract_from_bytes(bytes)
        }

        fn name(&self) -> &str {
            "CountingSource"
        }

        fn supports_file_type(&self, _path: &Path) -> bool {
            true
        }
    }

    #[test]
    fn test_cache_hit_skips_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cutoff.pdf");
        std::fs::write(&input, REPORT).unwrap();
        let extractions = Arc::new(AtomicUsize::new(0));
        let processor = CutoffProcessor::new_with_dependencies(
            Box::new(CountingSource {
                extractions: extractions.clone(),
            }),
            Box::new(FileStorage::new(dir.path().join("cache")).unwrap()),
            CutoffParser::default(),
        );

        let first = processor.process_file(&input).unwrap();
        let second = processor.process_file(&input).unwrap();

        assert!(second.success);
        assert_eq!(first.totals, second.totals);
        assert_eq!(extractions.load(Ordering::SeqCst), 1);

        // Changed bytes are a new key
        std::fs::write(&input, REPORT.replace("600", "650")).unwrap();
        let third = processor.process_file(&input).unwrap();
        assert_eq!(third.colleges[0].branches[0].cutoffs[1].rank, 650);
        assert_eq!(extractions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_profiler_records_only_when_enabled() {
        let mut enabled = StepProfiler::new(true);
        assert_eq!(enabled.time_step("1. Parse", || 7), 7);
        enabled.time_step("2. Store", || ());
        let names: Vec<&str> = enabled.timings().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["1. Parse", "2. Store"]);

        let mut disabled = StepProfiler::new(false);
        assert_eq!(disabled.time_step("1. Parse", || "ok"), "ok");
        assert!(disabled.timings().is_empty());
    }

    #[test]
    fn test_cache_steps_are_timed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cutoff.txt");
        std::fs::write(&input, REPORT).unwrap();
        let (processor, _) = processor_with_hits(&dir.path().join("cache"));

        let mut profiler = StepProfiler::new(true);
        let key = processor.cache_key(REPORT.as_bytes(), processor.source_name()).unwrap();
        assert!(processor.lookup(&key, &mut profiler, false).is_none());
        let result = processor.parser().parse_text(REPORT);
        processor.store(&key, &result, &mut profiler, false, Instant::now());
        assert!(processor.lookup(&key, &mut profiler, false).is_some());

        let names: Vec<&str> = profiler.timings().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["3. Cache Lookup", "6. Cache Storage", "3. Cache Lookup"]);
        assert!(processor.process_file_with_profiling(&input, true, false).unwrap().success);
    }
}
