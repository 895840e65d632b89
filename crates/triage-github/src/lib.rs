//! GitHub side of triage: the provider seam, the octocrab-backed adapter,
//! the concurrent fetch orchestrator, and the enrichment worker pool.

pub mod cancel;
pub mod client;
pub mod enrich;
pub mod orchestrator;
pub mod progress;
pub mod provider;
pub mod stub;
mod wire;

pub use cancel::CancelFlag;
pub use client::GitHubProvider;
pub use orchestrator::{fetch_all, merge, FetchOptions, FetchResult, MergeStats};
pub use progress::{progress_channel, ProgressEvent, Source};
pub use provider::{Provider, ProviderError};
