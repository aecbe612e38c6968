use std::fs;
use std::path::Path;
use std::time::Instant;

use clap::Args;

use facet_compiler::{build_tables, optimize_entries, parse_fingerprint_list};
use facet_core::builtin::builtin_builder;
use facet_core::{FingerprintTables, HeaderPolicy};

/// Table selection flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct TableOptions {
    /// Fingerprint list files applied on top of the built-in tables
    #[arg(short, long = "tables", value_name = "LIST")]
    pub tables: Vec<String>,

    /// Also apply the bundled header vendor list
    #[arg(long)]
    pub vendors: bool,

    /// Start from empty tables instead of the built-in rule set
    #[arg(long)]
    pub no_builtin: bool,

    /// Capture only these response headers (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "KEYS", conflicts_with = "legacy_allow_list")]
    pub allow_headers: Vec<String>,

    /// Capture only the historical header interest list
    #[arg(long)]
    pub legacy_allow_list: bool,
}

#[derive(Debug, Clone)]
pub struct CompileStats {
    pub lists: usize,
    pub entries_before: usize,
    pub entries_after: usize,
    pub entries_deduped: usize,
    pub conflicts: usize,
    pub total_ms: f64,
}

pub fn load_tables(opts: &TableOptions, verbose: bool) -> Result<(FingerprintTables, CompileStats), String> {
    let start = Instant::now();
    let mut all_entries = Vec::new();
    let mut lists = 0usize;

    if opts.vendors {
        let entries = parse_fingerprint_list(facet_compiler::VENDOR_FINGERPRINTS)
            .map_err(|e| format!("Bundled vendor list: {}", e))?;
        if verbose {
            println!("  [vendors] bundled - {} entries", entries.len());
        }
        all_entries.extend(entries);
        lists += 1;
    }

    for (list_id, path) in opts.tables.iter().enumerate() {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
        let entries = parse_fingerprint_list(&content).map_err(|e| format!("'{}': {}", path, e))?;

        if verbose {
            println!(
                "  [{}] {} - {} lines, {} entries",
                list_id,
                Path::new(path).file_name().unwrap_or_default().to_string_lossy(),
                content.lines().count(),
                entries.len()
            );
        }

        all_entries.extend(entries);
        lists += 1;
    }

    let optimize_stats = optimize_entries(&mut all_entries);

    let base = if opts.no_builtin {
        FingerprintTables::builder()
    } else {
        builtin_builder()
    };
    let base = if opts.legacy_allow_list {
        base.header_policy(HeaderPolicy::legacy_allow_list())
    } else if !opts.allow_headers.is_empty() {
        base.header_policy(HeaderPolicy::allow_list(&opts.allow_headers))
    } else {
        base
    };

    let tables = build_tables(&all_entries, base).map_err(|e| e.to_string())?;

    let stats = CompileStats {
        lists,
        entries_before: optimize_stats.before,
        entries_after: optimize_stats.after,
        entries_deduped: optimize_stats.deduped,
        conflicts: optimize_stats.conflicts,
        total_ms: start.elapsed().as_secs_f64() * 1000.0,
    };

    Ok((tables, stats))
}
