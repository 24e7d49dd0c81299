//! Link preview refresher.
//!
//! The server enriches link ideas in the background, so a freshly created
//! link has no preview image yet. The refresher refetches the idea on a fixed
//! interval until its metadata carries an image, or until the poll has
//! failed `failure_ceiling` times in a row. Once settled it never polls
//! again; a new refresher has to be started for a new view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{self, Transport};
use crate::core::idea::{Idea, LinkMetadata};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_FAILURE_CEILING: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub failure_ceiling: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            failure_ceiling: DEFAULT_FAILURE_CEILING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleReason {
    /// Not a link, or the image was already there.
    NotNeeded,
    ImageArrived,
    RetriesExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Polling,
    Settled(SettleReason),
}

/// What the consumer should draw for the idea right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Polling, and no metadata has arrived yet.
    Placeholder,
    Ready(LinkPreview),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPreview {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshState {
    pub phase: RefreshPhase,
    /// The idea as the consumer first saw it.
    pub original: Idea,
    /// Last successfully fetched representation.
    pub latest: Option<Idea>,
    /// Newest metadata seen so far.
    pub metadata: Option<LinkMetadata>,
    pub attempts: u32,
    /// Consecutive failed polls.
    pub failures: u32,
}

impl RefreshState {
    pub fn new(idea: Idea) -> Self {
        let phase = if idea.needs_enrichment() {
            RefreshPhase::Polling
        } else {
            RefreshPhase::Settled(SettleReason::NotNeeded)
        };
        Self {
            phase,
            metadata: idea.link_metadata.clone(),
            original: idea,
            latest: None,
            attempts: 0,
            failures: 0,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, RefreshPhase::Settled(_))
    }

    pub fn record_success(&mut self, fetched: Idea) {
        if self.is_settled() {
            return;
        }
        self.attempts += 1;
        self.failures = 0;
        // Metadata only ever moves forward; a response without any keeps
        // what we already have.
        if fetched.link_metadata.is_some() {
            self.metadata = fetched.link_metadata.clone();
        }
        if fetched.has_preview_image() {
            self.phase = RefreshPhase::Settled(SettleReason::ImageArrived);
        }
        self.latest = Some(fetched);
    }

    pub fn record_failure(&mut self, ceiling: u32) {
        if self.is_settled() {
            return;
        }
        self.attempts += 1;
        self.failures += 1;
        if self.failures >= ceiling {
            self.phase = RefreshPhase::Settled(SettleReason::RetriesExhausted);
        }
    }

    pub fn preview(&self) -> Preview {
        if self.metadata.is_none() && self.phase == RefreshPhase::Polling {
            return Preview::Placeholder;
        }
        let meta = self.metadata.as_ref();
        let title = self
            .latest
            .as_ref()
            .and_then(|i| i.title.clone())
            .or_else(|| self.original.title.clone())
            .or_else(|| meta.and_then(|m| m.title.clone()))
            .or_else(|| self.original.url.clone())
            .unwrap_or_default();
        let description = self
            .original
            .content
            .clone()
            .or_else(|| meta.and_then(|m| m.description.clone()));
        Preview::Ready(LinkPreview {
            title,
            description,
            image_url: meta.and_then(|m| m.image_url.clone()).filter(|u| !u.trim().is_empty()),
            url: self.original.url.clone(),
        })
    }
}

/// Starts refreshers against a shared transport.
#[derive(Clone)]
pub struct LinkRefresher {
    transport: Arc<dyn Transport>,
    config: RefreshConfig,
}

impl LinkRefresher {
    pub fn new(transport: Arc<dyn Transport>, config: RefreshConfig) -> Self {
        Self { transport, config }
    }

    /// Begin refreshing `idea`. Ideas that need no enrichment settle at once
    /// and never touch the network.
    pub fn start(&self, idea: Idea) -> RefreshHandle {
        let initial = RefreshState::new(idea);
        let settled = initial.is_settled();
        let idea_id = initial.original.id.clone();
        let (state_tx, state_rx) = watch::channel(initial);
        let (visible_tx, visible_rx) = watch::channel(true);

        let task = if settled {
            None
        } else {
            log::debug!("Refreshing link preview for idea {}", idea_id);
            Some(tokio::spawn(poll(
                self.transport.clone(),
                self.config,
                idea_id,
                state_tx,
                visible_rx,
            )))
        };

        RefreshHandle {
            state: state_rx,
            visible: visible_tx,
            task,
        }
    }
}

async fn poll(
    transport: Arc<dyn Transport>,
    config: RefreshConfig,
    idea_id: String,
    state: watch::Sender<RefreshState>,
    mut visible: watch::Receiver<bool>,
) {
    loop {
        // Paused while hidden; the failure count carries over.
        if visible.wait_for(|v| *v).await.is_err() {
            return;
        }

        let result = api::ideas::get_idea(&*transport, &idea_id).await;
        let mut settled = false;
        state.send_modify(|s| {
            match result {
                Ok(idea) => s.record_success(idea),
                Err(e) => {
                    log::warn!("Failed to refetch idea {}: {}", idea_id, e);
                    s.record_failure(config.failure_ceiling);
                }
            }
            settled = s.is_settled();
        });

        if settled {
            let phase = state.borrow().phase;
            log::info!("Link preview for idea {} settled: {:?}", idea_id, phase);
            return;
        }
        tokio::time::sleep(config.interval).await;
    }
}

/// Owned by the consuming view. Dropping it stops polling.
pub struct RefreshHandle {
    state: watch::Receiver<RefreshState>,
    visible: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    pub fn preview(&self) -> Preview {
        self.state.borrow().preview()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.clone()
    }

    /// Pause or resume polling as the consumer is hidden or shown.
    pub fn set_visible(&self, visible: bool) {
        self.visible.send_replace(visible);
    }

    /// Wait until polling has stopped, by settling or cancellation.
    pub async fn settled(&mut self) -> RefreshState {
        // Err means the poller is gone; the last state stands.
        let _ = self.state.wait_for(RefreshState::is_settled).await;
        self.state.borrow().clone()
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
