use chrono::{DateTime, Utc};

/// The four secondary sources plus notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Notifications,
    ReviewPrs,
    AuthoredPrs,
    AssignedIssues,
    Orphaned,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Notifications => "notifications",
            Source::ReviewPrs => "review PRs",
            Source::AuthoredPrs => "authored PRs",
            Source::AssignedIssues => "assigned issues",
            Source::Orphaned => "orphaned",
        }
    }
}

/// Progress UI events. These are advisory: producers drop on a full channel
/// and no consumer state depends on receiving every one.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    SourceCompleted {
        source: Source,
        count: usize,
        from_cache: bool,
    },
    SourceFailed {
        source: Source,
        message: String,
    },
    Enrichment {
        completed: usize,
        total: usize,
    },
    RateLimited {
        reset: Option<DateTime<Utc>>,
    },
}

/// Bounded events channel into the UI; one consumer, many producers.
pub fn progress_channel() -> (flume::Sender<ProgressEvent>, flume::Receiver<ProgressEvent>) {
    flume::bounded(100)
}

/// Non-blocking send; dropped events are progress-only, never stateful.
pub fn emit(tx: &flume::Sender<ProgressEvent>, event: ProgressEvent) {
    let _ = tx.try_send(event);
}
