//! Per-page facet pipeline
//!
//! Runs the extractor stages in fixed order over one page, concatenates
//! their outputs and collapses repeated boolean facets. The engine borrows
//! the tables and holds no per-page state, so a single engine can serve any
//! number of threads at once.

use std::time::Instant;

use crate::cookies::cookie_facets;
use crate::dedup::facet_dedup;
use crate::embeds::embed_facets;
use crate::grep::grep_facets;
use crate::head::{head_facets, parse_exception, HeadDocument};
use crate::headers::header_facets;
use crate::metrics::{FacetMetrics, NoopMetrics};
use crate::tables::FingerprintTables;
use crate::types::{Facet, ResponseHeader, Stage, Stages};
use crate::url::EmbeddedResource;

/// Default bound on head bytes handed to the structured parser (1 MiB).
pub const DEFAULT_MAX_HEAD_BYTES: usize = 1 << 20;

static NOOP_METRICS: NoopMetrics = NoopMetrics;

/// Everything the pipeline sees of one fetched page.
#[derive(Debug, Clone, Copy)]
pub struct PageInput<'a> {
    /// Page URL, used only for log context
    pub url: Option<&'a str>,
    /// Raw head fragment as fetched
    pub head_bytes: &'a [u8],
    /// Head already parsed by the caller; skips the structured parse
    pub head: Option<&'a HeadDocument>,
    pub headers: &'a [ResponseHeader],
    pub embeds: &'a [EmbeddedResource],
}

impl<'a> PageInput<'a> {
    pub fn new(
        head_bytes: &'a [u8],
        headers: &'a [ResponseHeader],
        embeds: &'a [EmbeddedResource],
    ) -> Self {
        Self {
            url: None,
            head_bytes,
            head: None,
            headers,
            embeds,
        }
    }

    pub fn with_url(mut self, url: &'a str) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_head_document(mut self, head: &'a HeadDocument) -> Self {
        self.head = Some(head);
        self
    }

    fn header_bytes(&self) -> usize {
        self.headers.iter().map(|h| h.key.len() + h.value.len()).sum()
    }

    fn embed_bytes(&self) -> usize {
        self.embeds.iter().map(|e| e.url.len()).sum()
    }

    fn cookie_bytes(&self) -> usize {
        self.headers
            .iter()
            .filter(|h| h.is_set_cookie())
            .map(|h| h.value.len())
            .sum()
    }
}

/// Facet extraction engine bound to one set of tables.
pub struct FacetEngine<'a> {
    tables: &'a FingerprintTables,
    metrics: &'a dyn FacetMetrics,
    max_head_bytes: usize,
}

impl<'a> FacetEngine<'a> {
    pub fn new(tables: &'a FingerprintTables) -> Self {
        Self {
            tables,
            metrics: &NOOP_METRICS,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
        }
    }

    /// Report stage timings to `metrics`.
    pub fn with_metrics(mut self, metrics: &'a dyn FacetMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_max_head_bytes(mut self, max_head_bytes: usize) -> Self {
        self.max_head_bytes = max_head_bytes;
        self
    }

    /// Run every stage and deduplicate.
    pub fn compute_all(&self, page: &PageInput<'_>) -> Vec<Facet> {
        self.compute_stages(page, Stages::ALL)
    }

    /// Run the selected stages in pipeline order and deduplicate.
    pub fn compute_stages(&self, page: &PageInput<'_>, stages: Stages) -> Vec<Facet> {
        let mut facets = Vec::new();

        for stage in Stage::ORDER {
            if !stages.contains(stage.bit()) {
                continue;
            }

            let start = Instant::now();
            let (out, input_bytes) = self.run_stage(stage, page);
            self.metrics.record_stage(stage, start.elapsed(), input_bytes);

            log::debug!(
                "{} stage: {} facet(s) from {} byte(s){}",
                stage,
                out.len(),
                input_bytes,
                page.url.map(|u| format!(" [{}]", u)).unwrap_or_default()
            );
            facets.extend(out);
        }

        facet_dedup(facets)
    }

    fn run_stage(&self, stage: Stage, page: &PageInput<'_>) -> (Vec<Facet>, usize) {
        let tables = self.tables;
        match stage {
            Stage::HeadStructured => (self.structured_head(page), page.head_bytes.len()),
            Stage::HeadGrep => (grep_facets(page.head_bytes, tables), page.head_bytes.len()),
            Stage::Headers => (header_facets(page.headers, tables), page.header_bytes()),
            Stage::Embeds => (embed_facets(page.embeds, tables), page.embed_bytes()),
            Stage::Cookies => (cookie_facets(page.headers, tables), page.cookie_bytes()),
        }
    }

    fn structured_head(&self, page: &PageInput<'_>) -> Vec<Facet> {
        if let Some(doc) = page.head {
            return head_facets(doc, self.tables);
        }

        match HeadDocument::parse(page.head_bytes, self.max_head_bytes) {
            Ok(doc) => head_facets(&doc, self.tables),
            Err(e) => {
                log::warn!(
                    "Head parse failed{}: {}",
                    page.url.map(|u| format!(" for {}", u)).unwrap_or_default(),
                    e
                );
                vec![parse_exception(&e)]
            }
        }
    }
}

/// Run the full pipeline over one page with default engine settings.
pub fn compute_all(page: &PageInput<'_>, tables: &FingerprintTables) -> Vec<Facet> {
    FacetEngine::new(tables).compute_all(page)
}
