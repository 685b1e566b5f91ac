use std::time::Duration;

use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::SourceConfig;

/// A feed entry as pulled off the wire, before aggregation.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub source: String,
    pub title: String,
    pub summary: String,
    pub date: DateTime<Utc>,
    pub link: String,
    pub highlights: Vec<String>,
}

/// Summaries longer than this are cut on a char boundary
const SUMMARY_MAX_CHARS: usize = 300;

pub struct Fetcher {
    client: Client,
    per_source_limit: usize,
}

impl Fetcher {
    pub fn new(per_source_limit: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Newscast/1.0 (AI News Briefing)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            per_source_limit,
        }
    }

    /// Fetch every configured source and return the union of their entries.
    /// A source that fails to fetch or parse is logged and skipped; an empty
    /// union is a valid result.
    pub async fn fetch_all(&self, sources: &[SourceConfig]) -> Vec<RawEntry> {
        let mut entries = Vec::new();
        for source in sources {
            match self.fetch_source(source).await {
                Ok(mut batch) => {
                    info!("Fetched {} entries from '{}'", batch.len(), source.name);
                    entries.append(&mut batch);
                }
                Err(e) => error!("Failed to fetch source '{}': {}", source.name, e),
            }
        }
        entries
    }

    pub async fn fetch_source(&self, source: &SourceConfig) -> anyhow::Result<Vec<RawEntry>> {
        info!("Fetching source: {} ({})", source.name, source.url);

        let response = self.client.get(&source.url).send().await?;
        let bytes = response.error_for_status()?.bytes().await?;

        parse_feed(source, &bytes, self.per_source_limit)
    }
}

/// Parse a feed body and map up to `limit` entries into [`RawEntry`] values.
/// Entries without a usable title or link are skipped.
pub fn parse_feed(
    source: &SourceConfig,
    bytes: &[u8],
    limit: usize,
) -> anyhow::Result<Vec<RawEntry>> {
    let parsed = parser::parse(bytes)?;

    let mut entries = Vec::new();
    for entry in parsed.entries.into_iter().take(limit) {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();

        if title.is_empty() {
            warn!("Skipping entry with no title from '{}'", source.name);
            continue;
        }

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        if link.is_empty() {
            warn!("Skipping entry with no link: {}", title);
            continue;
        }

        let raw_summary = entry
            .summary
            .as_ref()
            .map(|t| t.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default();

        let mut summary = truncate_chars(&strip_html(&raw_summary), SUMMARY_MAX_CHARS);
        if summary.is_empty() {
            summary = format!("Latest news from {}", source.name);
        }

        let date: DateTime<Utc> = entry.published.or(entry.updated).unwrap_or_else(Utc::now);

        let highlights = find_highlights(&title, &source.keywords);

        entries.push(RawEntry {
            source: source.name.clone(),
            title,
            summary,
            date,
            link,
            highlights,
        });
    }

    Ok(entries)
}

/// Remove HTML markup and return plain text. Tag bodies of `script` and
/// `style` are dropped entirely; basic entities are decoded and whitespace
/// is collapsed.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut remainder = html;

    while let Some(start) = remainder.find('<') {
        text.push_str(&remainder[..start]);
        let after = &remainder[start + 1..];
        let Some(end) = after.find('>') else {
            // Unterminated tag, drop the rest
            remainder = "";
            break;
        };
        let tag = after[..end].trim().to_ascii_lowercase();
        remainder = &after[end + 1..];

        for container in ["script", "style"] {
            if tag == container || tag.starts_with(&format!("{} ", container)) {
                let close = format!("</{}", container);
                match remainder.to_ascii_lowercase().find(&close) {
                    Some(pos) => {
                        remainder = &remainder[pos..];
                        remainder = match remainder.find('>') {
                            Some(gt) => &remainder[gt + 1..],
                            None => "",
                        };
                    }
                    None => remainder = "",
                }
                break;
            }
        }
    }
    text.push_str(remainder);

    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max` chars, appending `...` when something was
/// dropped.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Configured keywords that appear (case-insensitively) in the title.
pub fn find_highlights(title: &str, keywords: &[String]) -> Vec<String> {
    let title_lower = title.to_lowercase();
    keywords
        .iter()
        .filter(|kw| title_lower.contains(&kw.to_lowercase()))
        .cloned()
        .collect()
}
