//! Core library for `triage`: the canonical work-item model, the scoring
//! engine, display filters, configuration, and the small pieces of local
//! state (detail cache, resolved store, snapshot store) that persist
//! between runs.

pub mod cache;
pub mod config;
pub mod duration;
pub mod filters;
pub mod item;
pub mod resolved;
pub mod routing;
pub mod scoring;
pub mod snapshots;
pub mod stats;
pub mod weights;

pub use item::{
    CiStatus, Details, IssueDetails, Item, ItemKey, ItemState, PrDetails, PrioritizedItem,
    Priority, Reason, Repository, ReviewState, Subject, SubjectType,
};
pub use weights::Weights;
