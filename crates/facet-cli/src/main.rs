//! Facet CLI
//!
//! CLI tool for compiling fingerprint lists and extracting facets from
//! captured pages.

mod capture;
mod scan;
mod tables;

use std::fs;

use clap::{Parser, Subcommand};

use facet_core::{EmbeddedResource, FacetEngine, PageInput, Stages, DEFAULT_MAX_HEAD_BYTES};

use crate::capture::parse_header_lines;
use crate::scan::{run_scan, ScanOptions};
use crate::tables::{load_tables, TableOptions};

#[derive(Parser)]
#[command(name = "facet-cli")]
#[command(about = "Facet extraction for fetched web pages")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile fingerprint lists and print table statistics
    Check {
        #[command(flatten)]
        tables: TableOptions,
    },

    /// Extract facets from one captured page
    Extract {
        /// Raw head fragment
        #[arg(long)]
        head: Option<String>,

        /// Response headers, one `Key: value` per line
        #[arg(long)]
        headers: Option<String>,

        /// Embedded resource URLs, one per line
        #[arg(long)]
        embeds: Option<String>,

        /// Page URL for log context
        #[arg(long)]
        url: Option<String>,

        /// Stages to run (comma-separated: head, grep, headers, embeds, cookies, all)
        #[arg(long, value_delimiter = ',', default_value = "all")]
        stages: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        tables: TableOptions,
    },

    /// Extract facets from a JSONL capture file on a worker pool
    Scan {
        /// Capture file, one JSON page per line
        #[arg(short, long)]
        input: String,

        /// Output file (JSONL); stdout when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Concurrent extraction workers
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Stages to run (comma-separated)
        #[arg(long, value_delimiter = ',', default_value = "all")]
        stages: Vec<String>,

        /// Head size limit for structured parsing, in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_HEAD_BYTES)]
        max_head_bytes: usize,

        #[command(flatten)]
        tables: TableOptions,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { tables } => cmd_check(&tables, cli.verbose),
        Commands::Extract {
            head,
            headers,
            embeds,
            url,
            stages,
            pretty,
            tables,
        } => cmd_extract(
            ExtractInputs {
                head,
                headers,
                embeds,
                url,
            },
            &stages,
            pretty,
            &tables,
        ),
        Commands::Scan {
            input,
            output,
            workers,
            stages,
            max_head_bytes,
            tables,
        } => cmd_scan(input, output, workers, &stages, max_head_bytes, &tables),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_stages(names: &[String]) -> Result<Stages, String> {
    let mut stages = Stages::empty();
    for name in names {
        stages |= Stages::parse_name(name).ok_or_else(|| format!("Unknown stage '{}'", name))?;
    }
    Ok(stages)
}

fn cmd_check(opts: &TableOptions, verbose: bool) -> Result<(), String> {
    let (tables, stats) = load_tables(opts, verbose)?;
    let t = tables.stats();

    println!("Compiled {} fingerprint list(s)", stats.lists);
    println!(
        "  Entries:  {} -> {} (dedupe removed {}, conflicts {})",
        stats.entries_before, stats.entries_after, stats.entries_deduped, stats.conflicts
    );
    println!("  Time:     {:.1}ms", stats.total_ms);
    println!();
    println!("Tables:");
    println!("  Generator platforms:     {}", t.generator_platforms);
    println!("  Meta name prefixes:      {}", t.meta_name_prefixes);
    println!("  Meta properties:         {}", t.meta_properties);
    println!("  Meta property prefixes:  {}", t.meta_property_prefixes);
    println!("  Link relations:          {}", t.link_rels);
    println!("  Grep rules:              {}", t.grep_rules);
    match t.header_allow {
        Some(n) => println!("  Header policy:           allow-list ({} keys)", n),
        None => println!("  Header policy:           capture all"),
    }
    println!("  Header fingerprints:     {}", t.header_fingerprints);
    println!("  Embed rules:             {}", t.embed_rules);
    println!("  Cookie names:            {}", t.cookie_names);
    println!("  Cookie prefixes:         {}", t.cookie_prefixes);
    println!("  Cookie shapes:           {}", t.cookie_shapes);

    Ok(())
}

struct ExtractInputs {
    head: Option<String>,
    headers: Option<String>,
    embeds: Option<String>,
    url: Option<String>,
}

fn read_optional(path: &Option<String>) -> Result<Option<String>, String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map(Some)
            .map_err(|e| format!("Failed to read '{}': {}", path, e)),
        None => Ok(None),
    }
}

fn cmd_extract(inputs: ExtractInputs, stages: &[String], pretty: bool, opts: &TableOptions) -> Result<(), String> {
    let stages = parse_stages(stages)?;
    let (tables, _) = load_tables(opts, false)?;

    let head = match &inputs.head {
        Some(path) => fs::read(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?,
        None => Vec::new(),
    };
    let headers = read_optional(&inputs.headers)?
        .map(|text| parse_header_lines(&text))
        .unwrap_or_default();
    let embeds: Vec<EmbeddedResource> = read_optional(&inputs.embeds)?
        .map(|text| {
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|url| EmbeddedResource::new(url))
                .collect()
        })
        .unwrap_or_default();

    let mut page = PageInput::new(&head, &headers, &embeds);
    if let Some(url) = inputs.url.as_deref() {
        page = page.with_url(url);
    }

    let facets = FacetEngine::new(&tables).compute_stages(&page, stages);

    let json = if pretty {
        serde_json::to_string_pretty(&facets)
    } else {
        serde_json::to_string(&facets)
    }
    .map_err(|e| format!("Failed to encode facets: {}", e))?;
    println!("{}", json);

    Ok(())
}

fn cmd_scan(
    input: String,
    output: Option<String>,
    workers: usize,
    stages: &[String],
    max_head_bytes: usize,
    opts: &TableOptions,
) -> Result<(), String> {
    let stages = parse_stages(stages)?;
    let (tables, _) = load_tables(opts, false)?;

    run_scan(
        ScanOptions {
            input_path: input,
            output_path: output,
            workers,
            stages,
            max_head_bytes,
        },
        tables,
    )
}
