//! Per-domain crawl orchestration
//!
//! A [`DomainCrawler`] owns one seed's [`Frontier`] and walks the site with an
//! explicit work queue feeding a bounded pool of fetch tasks:
//! - The root page is fetched alone, so a root redirect re-keys the frontier
//!   before any discovered link is scoped
//! - Each finished page claims its links in the frontier; only won claims are queued
//! - The crawl ends when the queue is empty and no task is in flight, or when
//!   the optional domain deadline passes

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_with_retry, FetchOutcome, RetryPolicy};
use crate::crawler::parser::extract_links;
use crate::output::{FailureReason, PageRecord, RecordSink};
use crate::seed::SeedEntry;
use crate::state::{Claim, DomainPhase, Frontier, PageState};
use crate::url::{domain_key, normalize_path};
use crate::{CrawlError, UrlError};
use reqwest::Client;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::Instrument;
use url::Url;

/// Error text recorded for pages cut off by the domain deadline
pub const DEADLINE_EXCEEDED: &str = "deadline exceeded";

/// Summary of one domain's crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    /// Organization name from the seed list
    pub trust: String,
    pub seed_url: String,
    /// Domain key the records were emitted under
    pub domain: String,
    /// Seed domain key, when the root redirected to another host
    pub redirected_from: Option<String>,
    pub phase: DomainPhase,
    /// Fetches charged against the page budget
    pub scheduled: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// Non-HTML responses and redirects onto an already fetched path
    pub skipped: u32,
    pub out_of_scope: u32,
    pub deadline_hit: bool,
}

/// Everything a page task needs, shared by all tasks of one domain
#[derive(Debug)]
struct CrawlContext {
    client: Client,
    retry: RetryPolicy,
    frontier: Frontier,
    sink: RecordSink,
}

/// Outcome of one page task
#[derive(Debug)]
struct PageResult {
    state: PageState,
    out_of_scope: bool,
    /// Links this page won frontier claims for
    children: Vec<Url>,
}

impl PageResult {
    fn finished(state: PageState) -> Self {
        Self {
            state,
            out_of_scope: false,
            children: Vec::new(),
        }
    }
}

/// Crawls a single seed's site within its page budget
pub struct DomainCrawler {
    seed: SeedEntry,
    ctx: Arc<CrawlContext>,
    max_concurrent_fetches: usize,
    deadline: Option<Duration>,
}

impl DomainCrawler {
    /// Creates a crawler for `seed`
    ///
    /// Fails only if the seed URL has no host to derive a domain key from.
    pub fn new(
        seed: SeedEntry,
        client: Client,
        config: &CrawlerConfig,
        sink: RecordSink,
    ) -> Result<Self, CrawlError> {
        let domain = domain_key(&seed.url).ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            seed,
            ctx: Arc::new(CrawlContext {
                client,
                retry: RetryPolicy::from_config(config),
                frontier: Frontier::new(domain, config.page_limit),
                sink,
            }),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1) as usize,
            deadline: config.domain_deadline(),
        })
    }

    /// Domain key of the seed URL
    pub fn seed_domain(&self) -> String {
        self.ctx.frontier.seed_domain()
    }

    /// Runs the crawl to completion inside a span tagged with the trust and domain
    pub async fn run(self) -> Result<DomainReport, CrawlError> {
        let span = tracing::info_span!(
            "domain",
            trust = %self.seed.name,
            domain = %self.seed_domain()
        );
        self.crawl().instrument(span).await
    }

    async fn crawl(self) -> Result<DomainReport, CrawlError> {
        let frontier = &self.ctx.frontier;
        let deadline = self.deadline.map(|limit| Instant::now() + limit);
        let mut phase = DomainPhase::Pending;
        let mut report = DomainReport {
            trust: self.seed.name.clone(),
            seed_url: self.seed.url.to_string(),
            domain: frontier.seed_domain(),
            redirected_from: None,
            phase,
            scheduled: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            out_of_scope: 0,
            deadline_hit: false,
        };

        tracing::info!("Starting crawl at {}", self.seed.url);

        let mut queue = VecDeque::new();
        if frontier.try_claim(&normalize_path(self.seed.url.path())) {
            queue.push_back(self.seed.url.clone());
        } else {
            tracing::warn!("No page budget for {}, nothing to crawl", self.seed.url);
        }

        let mut in_flight = HashSet::new();
        let mut tasks: JoinSet<(String, Result<PageResult, CrawlError>)> = JoinSet::new();

        loop {
            while tasks.len() < self.max_concurrent_fetches {
                let Some(url) = queue.pop_front() else {
                    break;
                };
                let path = normalize_path(url.path());
                let is_root = phase == DomainPhase::Pending;
                let ctx = Arc::clone(&self.ctx);

                in_flight.insert(path.clone());
                tasks.spawn(
                    async move {
                        let result = process_page(ctx, url, is_root).await;
                        (path, result)
                    }
                    .in_current_span(),
                );
            }

            let joined = match deadline {
                Some(deadline) => match timeout_at(deadline, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        report.deadline_hit = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((path, Ok(page))) => {
                    tracing::debug!("{} is {}", path, page.state);
                    in_flight.remove(&path);
                    tally(&mut report, &page);
                    queue.extend(page.children);
                }
                Ok((path, Err(e))) => {
                    in_flight.remove(&path);
                    report.failed += 1;
                    tracing::error!("Failed to process {}: {}", path, e);
                    if matches!(e, CrawlError::SinkClosed) {
                        tasks.abort_all();
                        return Err(e);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Fetch task failed: {}", e);
                }
            }

            if phase == DomainPhase::Pending {
                phase = DomainPhase::Active;
                tracing::debug!("Root fetched, domain is now {}", phase);
            }
        }

        if report.deadline_hit {
            self.abandon(tasks, in_flight, queue, &mut report).await?;
        }

        phase = DomainPhase::Exhausted;
        let seed_domain = frontier.seed_domain();
        report.redirected_from = frontier.resolve(&seed_domain).map(|_| seed_domain);
        report.domain = frontier.canonical_domain();
        report.phase = phase;
        report.scheduled = frontier.scheduled();

        tracing::info!(
            "Crawl {}: {} succeeded, {} failed, {} skipped of {} scheduled, {} left in budget",
            phase,
            report.succeeded,
            report.failed,
            report.skipped,
            report.scheduled,
            frontier.remaining()
        );

        Ok(report)
    }

    /// Cancels outstanding work once the deadline has passed
    ///
    /// Tasks that completed before the abort already emitted their records;
    /// every other scheduled path, including links those tasks claimed after
    /// the deadline passed, gets a `deadline exceeded` failure.
    async fn abandon(
        &self,
        mut tasks: JoinSet<(String, Result<PageResult, CrawlError>)>,
        mut in_flight: HashSet<String>,
        mut queue: VecDeque<Url>,
        report: &mut DomainReport,
    ) -> Result<(), CrawlError> {
        tasks.abort_all();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((path, Ok(page))) => {
                    in_flight.remove(&path);
                    tally(report, &page);
                    queue.extend(page.children);
                }
                Ok((path, Err(e))) => {
                    in_flight.remove(&path);
                    report.failed += 1;
                    tracing::error!("Failed to process {}: {}", path, e);
                }
                Err(_) => {}
            }
        }

        let unfinished: BTreeSet<String> = in_flight
            .into_iter()
            .chain(queue.iter().map(|url| normalize_path(url.path())))
            .collect();

        tracing::warn!(
            "Domain deadline of {:?} reached, abandoning {} page(s)",
            self.deadline.unwrap_or_default(),
            unfinished.len()
        );

        let domain = self.ctx.frontier.canonical_domain();
        for path in unfinished {
            self.ctx.sink.emit(PageRecord::failure(
                domain.clone(),
                path,
                FailureReason::FetchError(DEADLINE_EXCEEDED.to_string()),
            ))?;
            report.failed += 1;
        }

        Ok(())
    }
}

fn tally(report: &mut DomainReport, page: &PageResult) {
    match page.state {
        PageState::Succeeded => report.succeeded += 1,
        PageState::Failed => report.failed += 1,
        PageState::Skipped => report.skipped += 1,
        PageState::Scheduled | PageState::Fetching => {}
    }
    if page.out_of_scope {
        report.out_of_scope += 1;
    }
}

/// Fetches one claimed page, emits its record and claims its links
///
/// Everything after the fetch is synchronous, so an aborted task has either
/// emitted its record in full or not at all.
async fn process_page(
    ctx: Arc<CrawlContext>,
    url: Url,
    is_root: bool,
) -> Result<PageResult, CrawlError> {
    let frontier = &ctx.frontier;
    let requested_path = normalize_path(url.path());
    let state = PageState::Scheduled.transition(PageState::Fetching)?;

    tracing::debug!("Fetching {}", url);
    let outcome = fetch_with_retry(&ctx.client, &url, &ctx.retry).await;

    let final_url = match &outcome {
        FetchOutcome::Page { final_url, .. }
        | FetchOutcome::NotHtml { final_url, .. }
        | FetchOutcome::HttpStatus { final_url, .. } => Some(final_url),
        FetchOutcome::Failed { .. } => None,
    };

    if let Some(final_url) = final_url {
        let final_domain = domain_key(final_url).ok_or(UrlError::MissingDomain)?;
        if !frontier.in_scope(&final_domain) {
            if is_root {
                frontier.record_redirect(&final_domain);
            } else {
                tracing::error!(
                    "Page {} resolved to {}, outside the crawl's domains",
                    url,
                    final_url
                );
                ctx.sink.emit(PageRecord::failure(
                    frontier.canonical_domain(),
                    requested_path,
                    FailureReason::OutOfScope,
                ))?;
                return Ok(PageResult {
                    state: state.transition(PageState::Failed)?,
                    out_of_scope: true,
                    children: Vec::new(),
                });
            }
        }
    }

    let domain = frontier.canonical_domain();

    match outcome {
        FetchOutcome::Page {
            final_url, body, ..
        } => {
            let path = normalize_path(final_url.path());
            if path != requested_path && !frontier.mark_visited(&path) {
                tracing::debug!("{} redirected to already visited {}", url, final_url);
                return Ok(PageResult::finished(state.transition(PageState::Skipped)?));
            }

            let links = extract_links(&body, &final_url, &frontier.scope());
            ctx.sink
                .emit(PageRecord::success(domain.clone(), path, body))?;
            let state = state.transition(PageState::Succeeded)?;

            let mut children = Vec::new();
            for link in links {
                match frontier.claim(&normalize_path(link.path())) {
                    Claim::Won { remaining } => {
                        tracing::debug!("Scheduled {} ({} left in budget)", link, remaining);
                        children.push(link);
                    }
                    Claim::AlreadyClaimed => {}
                    Claim::BudgetExhausted => {
                        tracing::info!("Reached domain limit for {}, halting crawl", domain);
                        break;
                    }
                }
            }

            Ok(PageResult {
                state,
                out_of_scope: false,
                children,
            })
        }

        FetchOutcome::NotHtml { content_type, .. } => {
            tracing::debug!("Skipping non-HTML page {} ({})", url, content_type);
            Ok(PageResult::finished(state.transition(PageState::Skipped)?))
        }

        FetchOutcome::HttpStatus { status, .. } => {
            tracing::warn!("{} returned HTTP {}", url, status);
            ctx.sink.emit(PageRecord::failure(
                domain,
                requested_path,
                FailureReason::Status(status),
            ))?;
            Ok(PageResult::finished(state.transition(PageState::Failed)?))
        }

        FetchOutcome::Failed { error, attempts } => {
            tracing::warn!("Failed to fetch {} after {} attempt(s): {}", url, attempts, error);
            ctx.sink.emit(PageRecord::failure(
                domain,
                requested_path,
                FailureReason::FetchError(error),
            ))?;
            Ok(PageResult::finished(state.transition(PageState::Failed)?))
        }
    }
}
