use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// This call won the claim; `remaining` budget left after it
    Won { remaining: u32 },
    /// The path was already scheduled earlier in this run
    AlreadyClaimed,
    /// The domain's budget is spent
    BudgetExhausted,
}

impl Claim {
    pub fn is_won(&self) -> bool {
        matches!(self, Self::Won { .. })
    }
}

/// Snapshot of the domain keys a crawl currently accepts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainScope {
    keys: HashSet<String>,
}

impl DomainScope {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, domain_key: &str) -> bool {
        self.keys.contains(domain_key)
    }
}

#[derive(Debug)]
struct FrontierState {
    seed_domain: String,
    canonical: String,
    scope: HashSet<String>,
    redirects: HashMap<String, String>,
    claimed: HashSet<String>,
    limit: u32,
    remaining: u32,
}

impl FrontierState {
    /// Spends one unit of budget, returning what is left
    fn decrement_budget(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }
}

/// Per-domain visited set, budget counter and redirect map
///
/// All state sits behind one mutex so the membership check, the insert and the
/// budget decrement happen as a single step: when the same path is discovered
/// from several pages at once, exactly one caller wins the claim. The lock is
/// never held across an `.await`.
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierState>,
}

impl Frontier {
    /// Creates a frontier for the domain `seed_domain` with `limit` fetches of budget
    pub fn new(seed_domain: impl Into<String>, limit: u32) -> Self {
        let seed_domain = seed_domain.into();
        let mut scope = HashSet::new();
        scope.insert(seed_domain.clone());

        Self {
            inner: Mutex::new(FrontierState {
                canonical: seed_domain.clone(),
                seed_domain,
                scope,
                redirects: HashMap::new(),
                claimed: HashSet::new(),
                limit,
                remaining: limit,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // Every critical section leaves the state consistent, so a panic
        // elsewhere while holding the lock does not invalidate it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically checks, inserts and spends budget for `path`
    pub fn claim(&self, path: &str) -> Claim {
        let mut state = self.lock();

        if state.remaining == 0 {
            return Claim::BudgetExhausted;
        }

        if !state.claimed.insert(path.to_string()) {
            return Claim::AlreadyClaimed;
        }

        let remaining = state.decrement_budget();
        Claim::Won { remaining }
    }

    /// Returns whether this call won the claim for `path`
    pub fn try_claim(&self, path: &str) -> bool {
        self.claim(path).is_won()
    }

    /// Marks `path` as visited without spending budget
    ///
    /// Used when a fetch that was already paid for lands on a different path
    /// (the root redirecting to `/home`, say), so that path is not fetched again.
    /// Returns false if it was already known.
    pub fn mark_visited(&self, path: &str) -> bool {
        self.lock().claimed.insert(path.to_string())
    }

    /// Re-keys the crawl under `resolved` after the root redirected there
    ///
    /// The original key stays in scope: links back to the old host are still
    /// the same logical site.
    pub fn record_redirect(&self, resolved: &str) {
        let mut state = self.lock();
        if state.canonical == resolved {
            return;
        }

        tracing::info!(
            "Redirect found, adding redirect from {} to {}",
            state.seed_domain,
            resolved
        );

        let from = state.seed_domain.clone();
        state.redirects.insert(from, resolved.to_string());
        state.scope.insert(resolved.to_string());
        state.canonical = resolved.to_string();
    }

    /// Domain key records are emitted under (redirect-resolved)
    pub fn canonical_domain(&self) -> String {
        self.lock().canonical.clone()
    }

    /// Domain key of the seed URL
    pub fn seed_domain(&self) -> String {
        self.lock().seed_domain.clone()
    }

    /// Resolved key for `domain`, if its root redirected
    pub fn resolve(&self, domain: &str) -> Option<String> {
        self.lock().redirects.get(domain).cloned()
    }

    pub fn in_scope(&self, domain_key: &str) -> bool {
        self.lock().scope.contains(domain_key)
    }

    pub fn scope(&self) -> DomainScope {
        DomainScope {
            keys: self.lock().scope.clone(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.lock().remaining
    }

    /// Number of fetches scheduled so far
    pub fn scheduled(&self) -> u32 {
        let state = self.lock();
        state.limit - state.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let frontier = Frontier::new("example.org", 10);
        assert_eq!(frontier.claim("/"), Claim::Won { remaining: 9 });
        assert_eq!(frontier.claim("/"), Claim::AlreadyClaimed);
        assert_eq!(frontier.scheduled(), 1);
    }

    #[test]
    fn test_budget_refuses_new_paths() {
        let frontier = Frontier::new("example.org", 2);
        assert!(frontier.try_claim("/"));
        assert!(frontier.try_claim("/a"));
        assert_eq!(frontier.claim("/b"), Claim::BudgetExhausted);
        assert_eq!(frontier.remaining(), 0);
    }

    #[test]
    fn test_duplicate_does_not_spend_budget() {
        let frontier = Frontier::new("example.org", 3);
        frontier.try_claim("/a");
        frontier.try_claim("/a");
        frontier.try_claim("/a");
        assert_eq!(frontier.remaining(), 2);
    }

    #[test]
    fn test_concurrent_claims_same_path() {
        let frontier = Arc::new(Frontier::new("example.org", 100));

        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..32)
                .map(|_| {
                    let frontier = frontier.clone();
                    s.spawn(move || frontier.try_claim("/shared") as usize)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(winners, 1);
        assert_eq!(frontier.scheduled(), 1);
    }

    #[test]
    fn test_concurrent_claims_respect_budget() {
        let frontier = Arc::new(Frontier::new("example.org", 10));

        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..100)
                .map(|i| {
                    let frontier = frontier.clone();
                    s.spawn(move || frontier.try_claim(&format!("/page{}", i)) as usize)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(winners, 10);
        assert_eq!(frontier.remaining(), 0);
    }

    #[test]
    fn test_redirect_rekeys_and_keeps_old_scope() {
        let frontier = Frontier::new("oldhost.org", 10);
        frontier.record_redirect("newhost.org");

        assert_eq!(frontier.canonical_domain(), "newhost.org");
        assert_eq!(frontier.seed_domain(), "oldhost.org");
        assert_eq!(frontier.resolve("oldhost.org").as_deref(), Some("newhost.org"));
        assert!(frontier.in_scope("newhost.org"));
        assert!(frontier.in_scope("oldhost.org"));
        assert!(!frontier.in_scope("other.org"));

        let scope = frontier.scope();
        assert!(scope.contains("oldhost.org"));
        assert!(scope.contains("newhost.org"));
    }

    #[test]
    fn test_redirect_to_same_domain_is_noop() {
        let frontier = Frontier::new("example.org", 10);
        frontier.record_redirect("example.org");
        assert!(frontier.resolve("example.org").is_none());
        assert_eq!(frontier.scope(), DomainScope::new(["example.org"]));
    }

    #[test]
    fn test_mark_visited_is_free() {
        let frontier = Frontier::new("example.org", 1);
        assert!(frontier.try_claim("/"));
        assert!(frontier.mark_visited("/home"));
        assert!(!frontier.mark_visited("/home"));
        assert_eq!(frontier.claim("/home"), Claim::BudgetExhausted);
    }

    #[test]
    fn test_exhausted_claims_report_budget_even_for_known_paths() {
        let frontier = Frontier::new("example.org", 1);
        frontier.try_claim("/");
        assert_eq!(frontier.claim("/"), Claim::BudgetExhausted);
    }
}
