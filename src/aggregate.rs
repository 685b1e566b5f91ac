use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetcher::RawEntry;

/// One news item as exposed to the dashboard. Immutable after aggregation;
/// `id` is unique within a single fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: u32,
    pub source: String,
    pub title: String,
    pub summary: String,
    pub date: DateTime<Utc>,
    pub link: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub overview: Vec<String>,
}

/// Merge entries from all sources: newest first, duplicates (by normalized
/// title) collapsed keeping the most recent, capped at `cap`, ids assigned
/// sequentially in final order.
pub fn aggregate(mut entries: Vec<RawEntry>, cap: usize) -> Vec<Article> {
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let mut seen = HashSet::new();
    let mut articles: Vec<Article> = Vec::new();
    for entry in entries {
        if articles.len() >= cap {
            break;
        }
        if !seen.insert(normalize_title(&entry.title)) {
            continue;
        }
        articles.push(Article {
            id: articles.len() as u32 + 1,
            source: entry.source,
            title: entry.title,
            summary: entry.summary,
            date: entry.date,
            link: entry.link,
            highlights: entry.highlights,
            overview: Vec::new(),
        });
    }
    articles
}

/// Dedupe key for titles: lowercased, punctuation stripped, whitespace
/// collapsed.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
