// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-off import of a channel's message history.
//!
//! The import runs in three steps:
//! 1. [`collect_entries`] reads the history and turns every URL in a message
//!    not posted by the bot into an [`ImportEntry`].
//! 2. [`order_entries`] optionally re-sorts the entries oldest first. The
//!    whole history is materialized before this happens.
//! 3. The entries are delivered to the sink in fixed-size batches, one at a
//!    time, with a short pause after every save and a longer pause between
//!    batches.
//!
//! Individual save failures are counted, not fatal. Only an authentication
//! error from the sink or a broken history stream stops the run.

use std::sync::Arc;
use std::time::Duration;

use bookrelay_config::model::ImportConfig;
use bookrelay_core::text::truncate;
use bookrelay_core::{
    BookmarkRequest, BookmarkSink, ChatMessage, HistoryQuery, MessageHistory, RelayError,
    extract_urls,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Messages between two progress lines while reading history.
const PROGRESS_INTERVAL: usize = 100;

/// Characters of message text shown per dry-run entry.
const DRY_RUN_PREVIEW: usize = 50;

/// Fully resolved import parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub days: Option<u32>,
    pub limit: Option<usize>,
    pub batch_size: usize,
    pub request_delay: Duration,
    pub batch_delay: Duration,
    pub reverse_order: bool,
    pub dry_run: bool,
}

impl ImportSettings {
    /// Messages at or before this instant are ignored.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days
            .map(|days| now - chrono::Duration::days(i64::from(days)))
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for ImportSettings {
    fn from(config: &ImportConfig) -> Self {
        Self {
            days: config.days,
            limit: config.limit,
            batch_size: config.batch_size.max(1),
            request_delay: Duration::from_millis(config.request_delay_ms),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            reverse_order: config.reverse_order,
            dry_run: config.dry_run,
        }
    }
}

/// One URL found in the history, with the message it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub url: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl ImportEntry {
    fn from_message(url: String, message: &ChatMessage) -> Self {
        Self {
            url,
            content: message.content.clone(),
            author: message.author.clone(),
            created_at: message.created_at,
        }
    }

    /// The save request for this entry; the message text becomes the excerpt.
    pub fn request(&self) -> BookmarkRequest {
        BookmarkRequest::new(self.url.clone()).with_excerpt(self.content.clone())
    }
}

/// Entries read from the history.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub entries: Vec<ImportEntry>,
    /// Messages read, including the bot's own.
    pub processed_messages: usize,
    /// Reading stopped early because of cancellation.
    pub interrupted: bool,
}

/// Counters reported at the end of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub processed_messages: usize,
    pub urls_found: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Batches started.
    pub batches: usize,
    /// Pauses inserted between batches.
    pub batch_pauses: usize,
    pub interrupted: bool,
}

/// Reads the history newest first and extracts one entry per URL.
///
/// The cutoff and limit are passed to the source and enforced again here, so
/// a source that ignores them still yields the right window.
pub async fn collect_entries(
    history: &dyn MessageHistory,
    settings: &ImportSettings,
    now: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<Collected, RelayError> {
    let cutoff = settings.cutoff(now);
    if let Some(cutoff) = cutoff {
        info!(after = %cutoff.format("%Y-%m-%d"), "reading messages after cutoff");
    }

    let mut stream = history.history(HistoryQuery {
        limit: settings.limit,
        after: cutoff,
        oldest_first: false,
    });
    let mut collected = Collected::default();

    loop {
        if settings
            .limit
            .is_some_and(|limit| collected.processed_messages >= limit)
        {
            break;
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                collected.interrupted = true;
                break;
            }
            next = stream.next() => next,
        };
        let Some(message) = next else {
            break;
        };
        let message = message?;

        if cutoff.is_some_and(|cutoff| message.created_at <= cutoff) {
            continue;
        }

        collected.processed_messages += 1;
        if !message.from_self {
            for url in extract_urls(&message.content) {
                collected.entries.push(ImportEntry::from_message(url, &message));
            }
        }

        if collected.processed_messages % PROGRESS_INTERVAL == 0 {
            info!(
                processed = collected.processed_messages,
                urls = collected.entries.len(),
                "reading history"
            );
        }
    }

    info!(
        processed = collected.processed_messages,
        urls = collected.entries.len(),
        "history read"
    );
    Ok(collected)
}

/// Sorts entries oldest first when `reverse_order` is set; otherwise leaves
/// them in the order they were read. Entries sharing a timestamp keep their
/// relative order.
pub fn order_entries(entries: &mut [ImportEntry], reverse_order: bool) {
    if reverse_order {
        debug!("sorting entries oldest first");
        entries.sort_by_key(|entry| entry.created_at);
    }
}

/// Imports the URLs found in a channel's history.
pub struct BacklogImporter {
    history: Arc<dyn MessageHistory>,
    sink: Option<Arc<dyn BookmarkSink>>,
    settings: ImportSettings,
}

impl BacklogImporter {
    /// An importer without a sink; only dry runs are possible until
    /// [`with_sink`](Self::with_sink) is called.
    pub fn new(history: Arc<dyn MessageHistory>, settings: ImportSettings) -> Self {
        Self {
            history,
            sink: None,
            settings,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn BookmarkSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Runs the import using the current time for the age cutoff.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<ImportReport, RelayError> {
        self.run_at(Utc::now(), cancel).await
    }

    /// Runs the import with the age cutoff measured from `now`.
    ///
    /// Cancellation stops delivery before the next save; counters gathered so
    /// far are returned with `interrupted` set.
    pub async fn run_at(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<ImportReport, RelayError> {
        let sink = match (&self.sink, self.settings.dry_run) {
            (_, true) => None,
            (Some(sink), false) => Some(sink.as_ref()),
            (None, false) => {
                return Err(RelayError::Config(
                    "a bookmark sink is required unless dry_run is set".into(),
                ));
            }
        };

        let collected = collect_entries(self.history.as_ref(), &self.settings, now, cancel).await?;
        let mut report = ImportReport {
            processed_messages: collected.processed_messages,
            urls_found: collected.entries.len(),
            interrupted: collected.interrupted,
            ..ImportReport::default()
        };
        if report.interrupted {
            warn!("import interrupted while reading history");
            return Ok(report);
        }

        let mut entries = collected.entries;
        order_entries(&mut entries, self.settings.reverse_order);

        match sink {
            None => {
                info!(urls = entries.len(), "dry run, nothing will be sent");
                for entry in &entries {
                    info!(
                        url = %entry.url,
                        message = %truncate(&entry.content, DRY_RUN_PREVIEW),
                        author = %entry.author,
                        date = %entry.created_at,
                        "would save"
                    );
                }
            }
            Some(sink) => {
                if let Err(e) = self.deliver(sink, &entries, &mut report, cancel).await {
                    error!(
                        succeeded = report.succeeded,
                        failed = report.failed,
                        error = %e,
                        "import aborted"
                    );
                    return Err(e);
                }
                info!(
                    succeeded = report.succeeded,
                    failed = report.failed,
                    interrupted = report.interrupted,
                    "import finished"
                );
            }
        }

        Ok(report)
    }

    async fn deliver(
        &self,
        sink: &dyn BookmarkSink,
        entries: &[ImportEntry],
        report: &mut ImportReport,
        cancel: &CancellationToken,
    ) -> Result<(), RelayError> {
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = entries.len().div_ceil(batch_size);
        info!(urls = entries.len(), batches = total_batches, "starting import");

        for (index, batch) in entries.chunks(batch_size).enumerate() {
            report.batches += 1;
            info!("batch {}/{} ({} URLs)", index + 1, total_batches, batch.len());

            for entry in batch {
                if cancel.is_cancelled() {
                    report.interrupted = true;
                    return Ok(());
                }

                if sink.save(&entry.request()).await? {
                    report.succeeded += 1;
                } else {
                    report.failed += 1;
                    warn!(url = %entry.url, "bookmark not saved");
                }

                if !pause(self.settings.request_delay, cancel).await {
                    report.interrupted = true;
                    return Ok(());
                }
            }

            if index + 1 < total_batches {
                report.batch_pauses += 1;
                info!(
                    delay_ms = self.settings.batch_delay.as_millis() as u64,
                    "pausing between batches"
                );
                if !pause(self.settings.batch_delay, cancel).await {
                    report.interrupted = true;
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

/// Sleeps for `duration`. Returns false if cancelled first.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
