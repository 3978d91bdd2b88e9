/// Page and domain lifecycle definitions
///
/// Pages move `Scheduled → Fetching → {Succeeded, Failed, Skipped}`; domains move
/// `Pending → Active → Exhausted`.
use crate::CrawlError;
use serde::Serialize;
use std::fmt;

/// Represents the current state of a single page task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Path won a frontier claim and is waiting for a worker
    Scheduled,

    /// Request is in flight (including backoff waits)
    Fetching,

    // ===== Terminal States =====
    /// HTML page fetched; a success record was emitted
    Succeeded,

    /// A failure record was emitted (HTTP status, fetch error, scope violation)
    Failed,

    /// Non-HTML response; dropped without a record
    Skipped,
}

impl PageState {
    /// Returns true if no further processing will happen for this page
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }

    /// Checks whether moving to `to` is a legal step
    pub fn can_transition_to(&self, to: PageState) -> bool {
        match self {
            Self::Scheduled => to == Self::Fetching,
            Self::Fetching => to.is_terminal(),
            Self::Succeeded | Self::Failed | Self::Skipped => false,
        }
    }

    /// Moves to `to`, rejecting illegal transitions
    pub fn transition(self, to: PageState) -> Result<PageState, CrawlError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CrawlError::InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Fetching => "fetching",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crawl phase of one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainPhase {
    /// Seed not yet fetched
    Pending,
    /// Root fetched, work remains
    Active,
    /// Budget spent or nothing left to claim
    Exhausted,
}

impl fmt::Display for DomainPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Exhausted => "exhausted",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(PageState::Succeeded.is_terminal());
        assert!(PageState::Failed.is_terminal());
        assert!(PageState::Skipped.is_terminal());
        assert!(!PageState::Scheduled.is_terminal());
        assert!(!PageState::Fetching.is_terminal());
    }

    #[test]
    fn test_happy_path() {
        let state = PageState::Scheduled
            .transition(PageState::Fetching)
            .and_then(|s| s.transition(PageState::Succeeded))
            .unwrap();
        assert_eq!(state, PageState::Succeeded);
    }

    #[test]
    fn test_cannot_skip_fetching() {
        let err = PageState::Scheduled
            .transition(PageState::Succeeded)
            .unwrap_err();
        assert!(matches!(
            err,
            CrawlError::InvalidTransition {
                from: PageState::Scheduled,
                to: PageState::Succeeded
            }
        ));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [PageState::Succeeded, PageState::Failed, PageState::Skipped] {
            for to in [
                PageState::Scheduled,
                PageState::Fetching,
                PageState::Succeeded,
                PageState::Failed,
                PageState::Skipped,
            ] {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(PageState::Fetching.to_string(), "fetching");
        assert_eq!(DomainPhase::Exhausted.to_string(), "exhausted");
    }
}
