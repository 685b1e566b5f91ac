use chrono::Utc;

use crate::aggregate::Article;
use crate::fetcher::truncate_chars;

pub const NO_NEWS_LINE: &str =
    "No news available yet. Click Start to fetch the latest AI updates.";

const OUTRO_LINE: &str = "That's all for this briefing. The dashboard has the full stories.";

/// Compose the narration script: dated intro, one line per article, outro.
/// The result never exceeds `max_chars`; when the budget runs out, whole
/// trailing articles are dropped rather than cutting text mid-sentence.
pub fn compose_script(articles: &[Article], max_chars: usize) -> String {
    if articles.is_empty() {
        return NO_NEWS_LINE.to_string();
    }

    let intro = format!(
        "Here is your AI news briefing for {}.",
        Utc::now().format("%A, %B %d")
    );

    let base_len = intro.chars().count() + 2 + OUTRO_LINE.chars().count();
    if base_len > max_chars {
        // Budget too small for even the frame; send a truncated intro
        return truncate_chars(&intro, max_chars);
    }

    let mut segments = vec![intro];
    let mut used = base_len;
    for article in articles {
        let line = article_line(article);
        let cost = line.chars().count() + 2;
        if used + cost > max_chars {
            break;
        }
        used += cost;
        segments.push(line);
    }
    segments.push(OUTRO_LINE.to_string());

    segments.join("\n\n")
}

fn article_line(article: &Article) -> String {
    let mut line = format!("From {}: {}", article.source, article.title);
    if !line.ends_with(['.', '!', '?']) {
        line.push('.');
    }
    line.push(' ');
    line.push_str(&article.summary);
    if !line.ends_with(['.', '!', '?']) {
        line.push('.');
    }
    line
}

const BIG_TECH: &[&str] = &["openai", "google", "microsoft", "anthropic", "nvidia", "meta"];
const FUNDING: &[&str] = &["funding", "raises", "valuation", "investment", "billion", "million"];
const PRODUCTS: &[&str] = &["launch", "release", "introduce", "announce", "new", "update"];
const RESEARCH: &[&str] = &["research", "study", "paper", "discover", "breakthrough"];
const REGULATION: &[&str] = &["eu", "regulation", "law", "policy", "government"];

const COMPANY_NAMES: &[&str] = &["OpenAI", "Google", "Microsoft", "Anthropic", "NVIDIA", "Meta"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Theme {
    BigTech,
    Funding,
    Products,
    Research,
    Regulation,
    Other,
}

fn theme_of(title: &str) -> Theme {
    let lower = title.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if contains_any(BIG_TECH) {
        Theme::BigTech
    } else if contains_any(FUNDING) {
        Theme::Funding
    } else if contains_any(PRODUCTS) {
        Theme::Products
    } else if contains_any(RESEARCH) {
        Theme::Research
    } else if contains_any(REGULATION) {
        Theme::Regulation
    } else {
        Theme::Other
    }
}

/// Themed overview text shown at the top of the dashboard: one headline per
/// non-empty theme bucket, in a fixed section order.
pub fn daily_overview(articles: &[Article]) -> String {
    if articles.is_empty() {
        return NO_NEWS_LINE.to_string();
    }

    let first_of = |theme: Theme| articles.iter().find(|a| theme_of(&a.title) == theme);

    let mut parts = vec![format!(
        "Here's what's happening in the world of AI on {}:",
        Utc::now().format("%A, %B %d")
    )];

    if let Some(lead) = first_of(Theme::BigTech) {
        let mut companies: Vec<&str> = COMPANY_NAMES
            .iter()
            .copied()
            .filter(|c| {
                articles
                    .iter()
                    .filter(|a| theme_of(&a.title) == Theme::BigTech)
                    .take(3)
                    .any(|a| a.title.to_lowercase().contains(&c.to_lowercase()))
            })
            .collect();
        companies.sort_unstable();
        parts.push(format!(
            "**Big Tech Moves:** {} made headlines today. {}.",
            companies.join(", "),
            lead.title
        ));
    }
    if let Some(lead) = first_of(Theme::Funding) {
        parts.push(format!("**Investment & Funding:** {}.", lead.title));
    }
    if let Some(lead) = first_of(Theme::Products) {
        parts.push(format!("**Product Updates:** {}.", lead.title));
    }
    if let Some(lead) = first_of(Theme::Research) {
        parts.push(format!("**Research & Innovation:** {}.", lead.title));
    }
    if let Some(lead) = first_of(Theme::Regulation) {
        parts.push(format!("**Policy & Regulation:** {}.", lead.title));
    }
    if parts.len() < 4 {
        if let Some(lead) = first_of(Theme::Other) {
            parts.push(format!("**Also noteworthy:** {}.", lead.title));
        }
    }

    parts.push("Scroll down for more details on each story.".to_string());
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(id: u32, source: &str, title: &str, summary: &str) -> Article {
        Article {
            id,
            source: source.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            date: Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap(),
            link: "https://example.com/a".to_string(),
            highlights: Vec::new(),
            overview: Vec::new(),
        }
    }

    mod compose_script_tests {
        use super::*;

        #[test]
        fn test_empty_articles_gives_no_news_line() {
            assert_eq!(compose_script(&[], 4800), NO_NEWS_LINE);
        }

        #[test]
        fn test_contains_per_article_lines() {
            let articles = vec![
                article(1, "TechCrunch AI", "Robots learn to fold laundry", "A new milestone."),
                article(2, "The Verge AI", "Chips get faster", "Another leap."),
            ];
            let script = compose_script(&articles, 4800);

            assert!(script.contains("From TechCrunch AI: Robots learn to fold laundry."));
            assert!(script.contains("A new milestone."));
            assert!(script.contains("From The Verge AI: Chips get faster."));
            assert!(script.ends_with(OUTRO_LINE));
        }

        #[test]
        fn test_never_exceeds_limit() {
            let articles: Vec<_> = (0..50)
                .map(|i| {
                    article(
                        i + 1,
                        "Feed",
                        &format!("Story number {} with a fairly long headline", i),
                        &"words ".repeat(40),
                    )
                })
                .collect();

            for limit in [200, 500, 1000, 4800] {
                let script = compose_script(&articles, limit);
                assert!(
                    script.chars().count() <= limit,
                    "limit {} exceeded: {}",
                    limit,
                    script.chars().count()
                );
            }
        }

        #[test]
        fn test_drops_whole_trailing_articles() {
            let articles: Vec<_> = (0..10)
                .map(|i| article(i + 1, "Feed", &format!("Story {}", i), &"s ".repeat(100)))
                .collect();

            // Small budget: only some articles fit, but the outro must survive
            let script = compose_script(&articles, 800);
            assert!(script.ends_with(OUTRO_LINE));

            // No article line is cut short: each included summary is complete
            for i in 0..10 {
                let marker = format!("From Feed: Story {}.", i);
                if script.contains(&marker) {
                    let tail = &script[script.find(&marker).unwrap()..];
                    let line = tail.split("\n\n").next().unwrap();
                    assert!(line.ends_with('.'), "article line cut short: {}", line);
                }
            }
        }

        #[test]
        fn test_tiny_budget_still_bounded() {
            let articles = vec![article(1, "Feed", "Story", "Summary.")];
            let script = compose_script(&articles, 20);
            assert!(script.chars().count() <= 20);
        }

        #[test]
        fn test_punctuation_not_doubled() {
            let articles = vec![article(1, "Feed", "Breaking news!", "It already ends.")];
            let script = compose_script(&articles, 4800);
            assert!(script.contains("From Feed: Breaking news! It already ends."));
            assert!(!script.contains("!."));
        }
    }

    mod daily_overview_tests {
        use super::*;

        #[test]
        fn test_empty_articles_gives_no_news_line() {
            assert_eq!(daily_overview(&[]), NO_NEWS_LINE);
        }

        #[test]
        fn test_big_tech_section_names_companies() {
            let articles = vec![
                article(1, "A", "OpenAI and Google square off over agents", "s"),
                article(2, "A", "Quiet day otherwise", "s"),
            ];
            let overview = daily_overview(&articles);

            assert!(overview.contains("**Big Tech Moves:**"));
            assert!(overview.contains("Google, OpenAI"));
            assert!(overview.contains("OpenAI and Google square off over agents."));
        }

        #[test]
        fn test_funding_section() {
            let articles = vec![article(1, "A", "Startup raises 200 million for robotics", "s")];
            let overview = daily_overview(&articles);
            assert!(overview.contains("**Investment & Funding:** Startup raises 200 million for robotics."));
        }

        #[test]
        fn test_theme_priority_big_tech_over_products() {
            // Contains both a company name and a product word
            assert_eq!(theme_of("Google launches a new TPU"), Theme::BigTech);
        }

        #[test]
        fn test_other_section_appears_when_sparse() {
            let articles = vec![article(1, "A", "Quiet curiosities from the lab bench", "s")];
            let overview = daily_overview(&articles);
            assert!(overview.contains("**Also noteworthy:**"));
        }

        #[test]
        fn test_closing_line_present() {
            let articles = vec![article(1, "A", "Anything", "s")];
            let overview = daily_overview(&articles);
            assert!(overview.ends_with("Scroll down for more details on each story."));
        }
    }
}
