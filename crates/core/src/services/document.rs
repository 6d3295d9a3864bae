//! Normalized document records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, Domain};

/// A fetched document ready for consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    pub id: String,
    pub domain: Domain,
    pub filename: String,
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(domain: Domain, entry: &CatalogEntry, content: String) -> Self {
        let title = extract_title(&content).unwrap_or_else(|| humanize(&entry.id));
        Self { id: entry.id.clone(), domain, filename: entry.filename.clone(), title, content }
    }
}

/// Catalog listing row; no body is fetched to build it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub title: String,
}

impl From<&CatalogEntry> for DocumentSummary {
    fn from(entry: &CatalogEntry) -> Self {
        Self { id: entry.id.clone(), filename: entry.filename.clone(), title: humanize(&entry.id) }
    }
}

/// Title from YAML front matter, else the first level-one heading.
pub fn extract_title(content: &str) -> Option<String> {
    let mut lines = content.lines();
    if lines.next().map(str::trim) == Some("---") {
        for line in lines {
            let line = line.trim();
            if line == "---" {
                break;
            }
            if let Some(value) = line.strip_prefix("title:") {
                let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    content
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `10_prompt-injection` becomes `10 Prompt Injection`.
pub fn humanize(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
