use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::aggregate::Article;

/// The complete dashboard state at a point in time. `ready` is only true
/// when `articles` is non-empty.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub ready: bool,
    pub articles: Vec<Article>,
    pub summary: String,
    pub podcast_link: Option<String>,
    pub user_name: String,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            ready: false,
            articles: Vec::new(),
            summary: String::new(),
            podcast_link: None,
            user_name: "there".to_string(),
        }
    }
}

/// Holder for the process-wide state singleton. Readers always get a
/// complete snapshot; every write swaps in a complete replacement, so a
/// poll can never observe a half-written update.
#[derive(Default)]
pub struct StateHolder {
    inner: RwLock<Arc<Snapshot>>,
}

impl StateHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.clone()
    }

    /// Swap in a complete replacement snapshot.
    pub async fn replace(&self, snapshot: Snapshot) {
        *self.inner.write().await = Arc::new(snapshot);
    }

    /// Rebuild the snapshot under the write lock and swap it in whole.
    async fn update(&self, mutate: impl FnOnce(&mut Snapshot)) {
        let mut guard = self.inner.write().await;
        let mut next = (**guard).clone();
        mutate(&mut next);
        *guard = Arc::new(next);
    }

    pub async fn set_user_name(&self, name: String) {
        self.update(|s| s.user_name = name).await;
    }

    pub async fn set_podcast_link(&self, link: Option<String>) {
        self.update(|s| s.podcast_link = link).await;
    }

    /// Publish a new article list. `ready` follows from the list being
    /// non-empty; the greeting name carries over.
    pub async fn load_articles(&self, articles: Vec<Article>, summary: String) {
        self.update(|s| {
            s.ready = !articles.is_empty();
            s.articles = articles;
            s.summary = summary;
        })
        .await;
    }

    /// Reset everything except the greeting name.
    pub async fn clear(&self) {
        self.update(|s| {
            s.ready = false;
            s.articles.clear();
            s.summary.clear();
            s.podcast_link = None;
        })
        .await;
    }
}
