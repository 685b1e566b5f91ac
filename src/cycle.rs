use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::aggregate::{aggregate, Article};
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::script::{compose_script, daily_overview};
use crate::speech::SpeechClient;
use crate::state::{Snapshot, StateHolder};

/// Router mount point for the artifact directory.
pub const AUDIO_ROUTE: &str = "/audio";

#[derive(Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Articles were published; `podcast` tells whether audio came with them.
    Completed { articles: usize, podcast: bool },
    /// Another cycle holds the guard; nothing was done.
    AlreadyRunning,
}

/// Runs one fetch cycle at a time: feeds, aggregation, narration,
/// synthesis, state publish. Concurrent triggers are refused so two cycles
/// never race on the artifact path.
pub struct CycleRunner {
    fetcher: Fetcher,
    speech: Option<SpeechClient>,
    state: Arc<StateHolder>,
    config: Config,
    running: RwLock<bool>,
}

impl CycleRunner {
    pub fn new(config: Config, speech: Option<SpeechClient>, state: Arc<StateHolder>) -> Self {
        Self {
            fetcher: Fetcher::new(config.per_source_limit),
            speech,
            state,
            config,
            running: RwLock::new(false),
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub async fn run_cycle(&self) -> anyhow::Result<CycleOutcome> {
        // Check if a cycle is already in flight
        {
            let mut running = self.running.write().await;
            if *running {
                info!("Fetch cycle already in progress, skipping");
                return Ok(CycleOutcome::AlreadyRunning);
            }
            *running = true;
        }

        let result = self.do_run_cycle().await;

        // Clear the guard
        {
            let mut running = self.running.write().await;
            *running = false;
        }

        result
    }

    async fn do_run_cycle(&self) -> anyhow::Result<CycleOutcome> {
        let entries = self.fetcher.fetch_all(&self.config.sources).await;
        let articles = aggregate(entries, self.config.max_articles);

        if articles.is_empty() {
            warn!("No articles fetched from any source this cycle");
            let user_name = self.state.snapshot().await.user_name.clone();
            self.state
                .replace(Snapshot {
                    user_name,
                    ..Snapshot::default()
                })
                .await;
            return Ok(CycleOutcome::Completed {
                articles: 0,
                podcast: false,
            });
        }

        let podcast_link = self.synthesize_podcast(&articles).await;
        let podcast = podcast_link.is_some();
        let count = articles.len();
        let summary = daily_overview(&articles);

        let user_name = self.state.snapshot().await.user_name.clone();
        self.state
            .replace(Snapshot {
                ready: true,
                articles,
                summary,
                podcast_link,
                user_name,
            })
            .await;

        info!("Cycle complete: {} articles, podcast: {}", count, podcast);
        Ok(CycleOutcome::Completed {
            articles: count,
            podcast,
        })
    }

    /// Synthesize the narration and write the artifact. Any failure is
    /// logged and degrades the cycle to articles-only.
    async fn synthesize_podcast(&self, articles: &[Article]) -> Option<String> {
        let speech = self.speech.as_ref()?;

        let script = compose_script(articles, self.config.synthesis.max_script_chars);
        info!("Composed narration script ({} chars)", script.chars().count());

        let path = PathBuf::from(&self.config.synthesis.artifact_path);
        if let Err(e) = speech.synthesize_to_file(&script, &path).await {
            warn!("Podcast synthesis failed, publishing articles only: {}", e);
            return None;
        }

        let file_name = path.file_name()?.to_string_lossy().into_owned();
        Some(format!("{}/{}", AUDIO_ROUTE, file_name))
    }
}
