use serde::{Deserialize, Serialize};

use facet_core::{EmbeddedResource, Facet, ResponseHeader};

/// One captured page as stored in a JSONL capture file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapturedPage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub head: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub embeds: Vec<String>,
}

impl CapturedPage {
    pub fn response_headers(&self) -> Vec<ResponseHeader> {
        self.headers
            .iter()
            .map(|(k, v)| ResponseHeader::new(k, v.as_str()))
            .collect()
    }

    pub fn embedded_resources(&self) -> Vec<EmbeddedResource> {
        self.embeds.iter().map(|u| EmbeddedResource::new(u.as_str())).collect()
    }
}

/// One output line.
#[derive(Debug, Serialize)]
pub struct PageFacets {
    pub url: Option<String>,
    pub facets: Vec<Facet>,
}

/// Parse a capture file, one page per non-empty line.
pub fn parse_capture_lines(text: &str) -> Result<Vec<CapturedPage>, String> {
    let mut pages = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let page: CapturedPage =
            serde_json::from_str(line).map_err(|e| format!("line {}: {}", idx + 1, e))?;
        pages.push(page);
    }
    Ok(pages)
}

/// Parse a plain-text header dump: `Key: value` per line.
pub fn parse_header_lines(text: &str) -> Vec<ResponseHeader> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(ResponseHeader::new(key, value.trim()))
        })
        .collect()
}
