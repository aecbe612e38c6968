//! Embedded-resource URLs and allocation-free query handling
//!
//! Vendor matching is substring-based, so URLs are never fully parsed.
//! Only the query string is split out, on demand, as string slices.

// =============================================================================
// Embedded Resource
// =============================================================================

/// A resource URL referenced by the page (`href`- or `src`-style embed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResource {
    /// Absolute URL as produced by the fetch/parse collaborator
    pub url: String,
    /// Byte range of the query string within `url` (without the `?`)
    query: Option<(usize, usize)>,
}

impl EmbeddedResource {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let query = get_query_position(&url);
        Self { url, query }
    }

    /// The raw query string, without the leading `?` or any fragment.
    #[inline]
    pub fn query(&self) -> &str {
        match self.query {
            Some((start, end)) => &self.url[start..end],
            None => "",
        }
    }

    /// Iterate `key=value` pairs of the query string, in order.
    pub fn query_pairs(&self) -> QueryPairs<'_> {
        query_pairs(self.query())
    }
}

impl From<&str> for EmbeddedResource {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for EmbeddedResource {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

// =============================================================================
// Query Extraction
// =============================================================================

/// Get the start and end positions of the query string in a URL.
/// Returns `None` when there is no `?` before the fragment.
#[inline]
pub fn get_query_position(url: &str) -> Option<(usize, usize)> {
    let bytes = url.as_bytes();

    let mut q_pos = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' {
            return None;
        }
        if b == b'?' {
            q_pos = Some(i);
            break;
        }
    }

    let start = q_pos? + 1;
    let mut end = bytes.len();
    for (i, &b) in bytes[start..].iter().enumerate() {
        if b == b'#' {
            end = start + i;
            break;
        }
    }

    Some((start, end))
}

/// Iterator over `&`-separated query pairs.
///
/// Values are returned raw (no percent-decoding). A pair without `=`
/// yields an empty value.
pub struct QueryPairs<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for QueryPairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.rest?;
            let (pair, tail) = match rest.find('&') {
                Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
                None => (rest, None),
            };
            self.rest = tail;

            if pair.is_empty() {
                continue;
            }

            return Some(match pair.find('=') {
                Some(eq_pos) => (&pair[..eq_pos], &pair[eq_pos + 1..]),
                None => (pair, ""),
            });
        }
    }
}

/// Split a raw query string into pairs.
pub fn query_pairs(query: &str) -> QueryPairs<'_> {
    QueryPairs {
        rest: if query.is_empty() { None } else { Some(query) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_query() {
        let query = |url: &str| EmbeddedResource::new(url).query().to_string();
        assert_eq!(query("https://example.com/a?b=1&c=2"), "b=1&c=2");
        assert_eq!(query("https://example.com/a?b=1#frag"), "b=1");
        assert_eq!(query("https://example.com/a#frag?b=1"), "");
        assert_eq!(query("https://example.com/a"), "");
        assert_eq!(query("https://example.com/a?"), "");
        assert_eq!(get_query_position("/x?y#z"), Some((3, 4)));
    }

    #[test]
    fn test_query_pairs() {
        let pairs: Vec<_> = query_pairs("id=GTM-ABCD12&l=dataLayer&&flag").collect();
        assert_eq!(pairs, vec![("id", "GTM-ABCD12"), ("l", "dataLayer"), ("flag", "")]);
    }

    #[test]
    fn test_query_pairs_raw_values() {
        let pairs: Vec<_> = query_pairs("q=a%20b&r=x=y").collect();
        assert_eq!(pairs, vec![("q", "a%20b"), ("r", "x=y")]);
    }

    #[test]
    fn test_embedded_resource_query() {
        let embed = EmbeddedResource::new("https://www.googletagmanager.com/gtm.js?id=GTM-ABCD12");
        assert_eq!(embed.query(), "id=GTM-ABCD12");
        assert_eq!(embed.query_pairs().next(), Some(("id", "GTM-ABCD12")));

        let bare = EmbeddedResource::from("//cdn.ampproject.org/v0.js");
        assert_eq!(bare.query(), "");
        assert_eq!(bare.query_pairs().next(), None);
    }
}
