//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: lifecycle of one page task (scheduled, fetching, succeeded, ...)
//! - `DomainPhase`: lifecycle of one domain's crawl (pending, active, exhausted)
//! - `Frontier`: per-domain visited set, budget counter and redirect map

mod frontier;
mod page_state;

pub use frontier::{Claim, DomainScope, Frontier};
pub use page_state::{DomainPhase, PageState};
