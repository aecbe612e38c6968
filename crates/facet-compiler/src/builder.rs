use facet_core::tables::{
    FingerprintTables, GrepRule, QueryCapture, ShapeRule, TableError, TablesBuilder,
};

use crate::parser::TableEntry;

/// Error type for table assembly.
#[derive(Debug, thiserror::Error)]
#[error("Invalid entry `{entry}`: {source}")]
pub struct BuildError {
    pub entry: String,
    #[source]
    pub source: TableError,
}

/// Apply parsed entries on top of `base`, in list order.
///
/// Use [`facet_core::builtin::builtin_builder`] as the base to extend the
/// built-in rule set, or [`FingerprintTables::builder`] to replace it.
pub fn build_tables(entries: &[TableEntry], base: TablesBuilder) -> Result<FingerprintTables, BuildError> {
    let mut builder = base;
    for entry in entries {
        builder = apply_entry(builder, entry).map_err(|source| BuildError {
            entry: entry.to_string(),
            source,
        })?;
    }
    Ok(builder.build())
}

fn apply_entry(builder: TablesBuilder, entry: &TableEntry) -> Result<TablesBuilder, TableError> {
    let builder = match entry {
        TableEntry::Cookie { name, label } => {
            if builder.has_cookie(name) {
                log::debug!("Cookie '{}' already labeled, keeping existing label", name);
            }
            builder.cookie(name, label)
        }
        TableEntry::CookiePrefix { prefix, label } => builder.cookie_prefix(prefix, label),
        TableEntry::CookieShape {
            label,
            prefix,
            len,
            pattern,
        } => builder.cookie_shape(ShapeRule::new(label, prefix, *len, pattern)?),
        TableEntry::Generator { platform } => builder.generator(platform),
        TableEntry::MetaNamePrefix { prefix, category } => builder.meta_name_prefix(prefix, category),
        TableEntry::MetaProperty { property } => builder.meta_property(property),
        TableEntry::MetaPropertyPrefix { prefix, category } => {
            builder.meta_property_prefix(prefix, category)
        }
        TableEntry::LinkRel { rel } => builder.link_rel(rel),
        TableEntry::Grep { label, pattern } => builder.grep_rule(GrepRule::presence(label, pattern)?),
        TableEntry::GrepCapture { label, pattern } => {
            builder.grep_rule(GrepRule::capture(label, pattern)?)
        }
        TableEntry::Embed { needle, label } => builder.embed(needle, label),
        TableEntry::EmbedQuery {
            needle,
            key,
            value_prefix,
            label,
        } => builder.embed_query(
            needle,
            QueryCapture {
                key: key.clone(),
                value_prefix: value_prefix.clone(),
                label: label.clone(),
            },
        ),
        TableEntry::Header { name, label } => builder.header_fingerprint(name, label),
        TableEntry::HeaderPrefix { prefix, label } => builder.header_prefix_fingerprint(prefix, label),
        TableEntry::HeaderAllow { name } => builder.header_allow(name),
    };
    Ok(builder)
}
