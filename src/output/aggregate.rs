//! Post-crawl aggregation
//!
//! Turns the flat record stream into a domain → path → body mapping plus an
//! error report, and flags domains that yielded fewer pages than the budget.
//! The result depends only on the set of records, never on their order.

use crate::output::record::PageRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// domain → (path → body)
pub type Consolidated = BTreeMap<String, BTreeMap<String, String>>;

/// One line of the error report
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub domain: String,
    pub path: String,
    pub reason: String,
}

/// A domain that returned fewer success records than the page limit
///
/// Informational: small sites legitimately have fewer pages than the budget.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnderBudget {
    pub domain: String,
    pub pages: usize,
    pub limit: u32,
}

/// Everything derived from one record stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub consolidated: Consolidated,
    /// Sorted by (domain, path, reason)
    pub errors: Vec<ErrorEntry>,
    /// Sorted by domain
    pub under_budget: Vec<UnderBudget>,
}

impl Aggregate {
    pub fn page_count(&self) -> usize {
        self.consolidated.values().map(BTreeMap::len).sum()
    }
}

/// Consolidates a record stream
///
/// Success records are grouped by domain; a repeated path overwrites the earlier
/// body (the frontier should prevent this, so it is logged). Every failure record
/// becomes an [`ErrorEntry`]. Every domain seen in the stream whose success count
/// is below `page_limit` yields one [`UnderBudget`] warning.
pub fn aggregate<'a, I>(records: I, page_limit: u32) -> Aggregate
where
    I: IntoIterator<Item = &'a PageRecord>,
{
    let mut consolidated = Consolidated::new();
    let mut errors = Vec::new();
    let mut domains = BTreeSet::new();

    for record in records {
        domains.insert(record.domain().to_string());

        match record {
            PageRecord::Success { domain, path, body } => {
                let pages = consolidated.entry(domain.clone()).or_default();
                if pages.insert(path.clone(), body.clone()).is_some() {
                    tracing::warn!("Duplicate success record for {}{}, keeping latest", domain, path);
                }
            }
            PageRecord::Failure {
                domain,
                path,
                reason,
            } => errors.push(ErrorEntry {
                domain: domain.clone(),
                path: path.clone(),
                reason: reason.to_string(),
            }),
        }
    }

    errors.sort();

    let under_budget: Vec<UnderBudget> = domains
        .into_iter()
        .filter_map(|domain| {
            let pages = consolidated.get(&domain).map_or(0, BTreeMap::len);
            (pages < page_limit as usize).then(|| UnderBudget {
                domain,
                pages,
                limit: page_limit,
            })
        })
        .collect();

    for warning in &under_budget {
        tracing::warn!(
            "Domain {} returned {} of {} pages, may be under-crawled",
            warning.domain,
            warning.pages,
            warning.limit
        );
    }

    Aggregate {
        consolidated,
        errors,
        under_budget,
    }
}
