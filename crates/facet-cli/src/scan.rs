use std::fs;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use facet_core::{FacetEngine, FingerprintTables, StageStats, Stages};

use crate::capture::{parse_capture_lines, CapturedPage, PageFacets};

pub struct ScanOptions {
    pub input_path: String,
    pub output_path: Option<String>,
    pub workers: usize,
    pub stages: Stages,
    pub max_head_bytes: usize,
}

pub fn run_scan(opts: ScanOptions, tables: FingerprintTables) -> Result<(), String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    runtime.block_on(run_scan_async(opts, tables))
}

async fn run_scan_async(opts: ScanOptions, tables: FingerprintTables) -> Result<(), String> {
    let content = fs::read_to_string(&opts.input_path)
        .map_err(|e| format!("Failed to read '{}': {}", opts.input_path, e))?;
    let pages = parse_capture_lines(&content).map_err(|e| format!("'{}': {}", opts.input_path, e))?;

    let workers = opts.workers.max(1);
    log::info!("Scanning {} page(s) with {} worker(s)", pages.len(), workers);

    let tables = Arc::new(tables);
    let stats = Arc::new(StageStats::new());
    let slots = Arc::new(Semaphore::new(workers));
    let start = Instant::now();

    let mut handles = Vec::with_capacity(pages.len());
    for page in pages {
        let permit = Arc::clone(&slots)
            .acquire_owned()
            .await
            .map_err(|e| format!("Worker pool closed: {}", e))?;
        let tables = Arc::clone(&tables);
        let stats = Arc::clone(&stats);
        let stages = opts.stages;
        let max_head_bytes = opts.max_head_bytes;

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            extract_page(page, &tables, stats.as_ref(), stages, max_head_bytes)
        }));
    }

    let mut out: Box<dyn Write> = match &opts.output_path {
        Some(path) => Box::new(BufWriter::new(
            fs::File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut total_facets = 0usize;
    let page_count = handles.len();
    for handle in handles {
        let result = handle.await.map_err(|e| format!("Worker failed: {}", e))?;
        total_facets += result.facets.len();
        let line = serde_json::to_string(&result).map_err(|e| format!("Failed to encode result: {}", e))?;
        writeln!(out, "{}", line).map_err(|e| format!("Failed to write result: {}", e))?;
    }
    out.flush().map_err(|e| format!("Failed to write result: {}", e))?;
    drop(out);

    let elapsed = start.elapsed();
    eprintln!();
    eprintln!("Scanned {} page(s), {} facet(s) in {:.1}ms", page_count, total_facets, elapsed.as_secs_f64() * 1000.0);
    eprintln!("  {:<10} {:>8} {:>12} {:>12} {:>12}", "Stage", "Calls", "Bytes", "Mean (μs)", "Max (μs)");
    for (stage, totals) in stats.snapshot() {
        eprintln!(
            "  {:<10} {:>8} {:>12} {:>12.1} {:>12.1}",
            stage.as_str(),
            totals.calls,
            totals.input_bytes,
            totals.mean().as_secs_f64() * 1_000_000.0,
            totals.max_elapsed.as_secs_f64() * 1_000_000.0,
        );
    }

    Ok(())
}

fn extract_page(
    page: CapturedPage,
    tables: &FingerprintTables,
    stats: &StageStats,
    stages: Stages,
    max_head_bytes: usize,
) -> PageFacets {
    let headers = page.response_headers();
    let embeds = page.embedded_resources();

    let mut input = facet_core::PageInput::new(page.head.as_bytes(), &headers, &embeds);
    if let Some(url) = page.url.as_deref() {
        input = input.with_url(url);
    }

    let facets = FacetEngine::new(tables)
        .with_metrics(stats)
        .with_max_head_bytes(max_head_bytes)
        .compute_stages(&input, stages);

    PageFacets {
        url: page.url,
        facets,
    }
}
