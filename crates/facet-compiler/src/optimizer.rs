use std::collections::{HashMap, HashSet};

use crate::parser::TableEntry;

pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
    pub conflicts: usize,
}

/// Remove duplicate entries, keeping the first occurrence.
///
/// An exact cookie or header name listed again with a different label is a
/// conflict: the first label is kept and the later entry dropped.
pub fn optimize_entries(entries: &mut Vec<TableEntry>) -> OptimizeStats {
    let before = entries.len();

    let mut seen: HashSet<TableEntry> = HashSet::new();
    let mut deduped = 0usize;
    entries.retain(|entry| {
        if seen.contains(entry) {
            deduped += 1;
            false
        } else {
            seen.insert(entry.clone());
            true
        }
    });

    let mut labels: HashMap<ExactKey, String> = HashMap::new();
    let mut conflicts = 0usize;
    entries.retain(|entry| {
        let Some((key, label)) = ExactKey::from_entry(entry) else {
            return true;
        };
        match labels.get(&key) {
            Some(first) => {
                log::warn!(
                    "Conflicting label for {} '{}': keeping '{}', dropping '{}'",
                    entry.kind(),
                    key.name,
                    first,
                    label
                );
                conflicts += 1;
                false
            }
            None => {
                labels.insert(key, label.to_string());
                true
            }
        }
    });

    let after = entries.len();

    OptimizeStats {
        before,
        after,
        deduped,
        conflicts,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExactKey {
    header: bool,
    name: String,
}

impl ExactKey {
    fn from_entry(entry: &TableEntry) -> Option<(Self, &str)> {
        match entry {
            TableEntry::Cookie { name, label } => Some((
                Self {
                    header: false,
                    name: name.clone(),
                },
                label.as_str(),
            )),
            TableEntry::Header { name, label } => Some((
                Self {
                    header: true,
                    name: name.clone(),
                },
                label.as_str(),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fingerprint_list;

    #[test]
    fn test_dedupes_keeping_first() {
        let mut entries = parse_fingerprint_list(
            "cookie | PHPSESSID | php\n\
             embed | cdn.ampproject.org | google amp\n\
             cookie | PHPSESSID | php\n\
             embed | cdn.ampproject.org | google amp\n",
        )
        .unwrap();
        let stats = optimize_entries(&mut entries);
        assert_eq!(stats.before, 4);
        assert_eq!(stats.after, 2);
        assert_eq!(stats.deduped, 2);
        assert_eq!(stats.conflicts, 0);
        assert_eq!(entries[0].kind(), "cookie");
        assert_eq!(entries[1].kind(), "embed");
    }

    #[test]
    fn test_conflicting_labels_keep_first() {
        let mut entries = parse_fingerprint_list(
            "cookie | SERVERID | haproxy\n\
             header | x-served-by | fastly\n\
             cookie | SERVERID | other\n\
             header | X-Served-By | varnish\n\
             cookie-prefix | SERVERID | prefix rules are ordered, not keyed\n",
        )
        .unwrap();
        let stats = optimize_entries(&mut entries);
        assert_eq!(stats.conflicts, 2);
        assert_eq!(stats.after, 3);
        assert_eq!(
            entries[0],
            TableEntry::Cookie {
                name: "SERVERID".to_string(),
                label: "haproxy".to_string(),
            }
        );
        assert_eq!(
            entries[1],
            TableEntry::Header {
                name: "x-served-by".to_string(),
                label: "fastly".to_string(),
            }
        );
    }

    #[test]
    fn test_cookie_and_header_names_are_separate() {
        let mut entries = parse_fingerprint_list("cookie | tk | a\nheader | tk | b\n").unwrap();
        let stats = optimize_entries(&mut entries);
        assert_eq!(stats.conflicts, 0);
        assert_eq!(entries.len(), 2);
    }
}
