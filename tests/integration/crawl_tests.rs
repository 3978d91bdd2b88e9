//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::path::Path;
use tempfile::TempDir;
use trust_crawler::config::{Config, CrawlerConfig, InputConfig, OutputConfig, UserAgentConfig};
use trust_crawler::crawler::{crawl, run_pipeline};
use trust_crawler::output::{read_records, reaggregate, FailureReason};
use trust_crawler::{aggregate, domain_key, PageRecord, SeedEntry};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing all outputs into `dir`
fn create_test_config(dir: &Path, page_limit: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            page_limit,
            fetch_timeout_ms: 2_000,
            backoff_ms: 1,
            max_fetch_attempts: 2,
            max_concurrent_fetches: 4,
            max_concurrent_domains: 4,
            domain_deadline_secs: Some(30),
            max_redirects: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        input: InputConfig {
            seeds_path: dir.join("seeds.csv").display().to_string(),
        },
        output: OutputConfig {
            records_path: dir.join("trusts.jsonl").display().to_string(),
            consolidated_path: dir.join("trusts_consolidated.json").display().to_string(),
            errors_path: dir.join("trusts_errored.json").display().to_string(),
        },
    }
}

fn seed(name: &str, server: &MockServer) -> SeedEntry {
    SeedEntry {
        name: name.to_string(),
        url: Url::parse(&format!("{}/", server.uri())).unwrap(),
    }
}

fn key_of(server: &MockServer) -> String {
    domain_key(&Url::parse(&server.uri()).unwrap()).unwrap()
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_budget_caps_domain_and_ignores_other_hosts() {
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>other</p>", "text/html"))
        .expect(0)
        .mount(&other)
        .await;

    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string()).await;
    mount_html(
        &server,
        "/a",
        format!(r#"<a href="/b">B</a><a href="{}/x">X</a>"#, other.uri()),
    )
    .await;
    mount_html(
        &server,
        "/b",
        format!(r#"<a href="/a">A</a><a href="{}/x">X</a>"#, other.uri()),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 2);
    let outcome = crawl(&config, vec![seed("ExampleTrust", &server)]).await.unwrap();

    let domain = key_of(&server);
    let successes: Vec<&PageRecord> = outcome.records.iter().filter(|r| r.is_success()).collect();
    assert_eq!(successes.len(), 2);
    assert!(successes.iter().all(|r| r.domain() == domain));
    assert!(successes.iter().any(|r| r.path() == "/"));
    assert!(outcome.records.iter().all(|r| r.domain() != key_of(&other)));

    let report = &outcome.reports[0];
    assert_eq!(report.scheduled, 2);
    assert_eq!(report.succeeded, 2);
}

#[tokio::test]
async fn test_root_redirect_accepts_both_hosts() {
    let newhost = MockServer::start().await;
    let oldhost = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/", newhost.uri()).as_str()),
        )
        .mount(&oldhost)
        .await;
    mount_html(&oldhost, "/legacy", "<p>legacy</p>".to_string()).await;

    mount_html(
        &newhost,
        "/",
        format!(
            r#"<a href="{}/page">page</a><a href="{}/legacy">legacy</a>"#,
            newhost.uri(),
            oldhost.uri()
        ),
    )
    .await;
    mount_html(&newhost, "/page", "<p>page</p>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 10);
    let outcome = crawl(&config, vec![seed("MovedTrust", &oldhost)]).await.unwrap();

    let new_key = key_of(&newhost);
    let mut paths: Vec<&str> = outcome
        .records
        .iter()
        .filter(|r| r.is_success())
        .map(|r| {
            assert_eq!(r.domain(), new_key);
            r.path()
        })
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["/", "/legacy", "/page"]);

    let report = &outcome.reports[0];
    assert_eq!(report.domain, new_key);
    assert_eq!(report.redirected_from.as_deref(), Some(key_of(&oldhost).as_str()));
}

#[tokio::test]
async fn test_not_found_is_recorded_and_other_domains_continue() {
    let broken = MockServer::start().await;
    mount_html(&broken, "/", r#"<a href="/missing">gone</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("<p>nope</p>", "text/html"))
        .mount(&broken)
        .await;

    let healthy = MockServer::start().await;
    mount_html(&healthy, "/", r#"<a href="/about">about</a>"#.to_string()).await;
    mount_html(&healthy, "/about", "<p>about</p>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 10);
    let outcome = crawl(
        &config,
        vec![seed("Broken", &broken), seed("Healthy", &healthy)],
    )
    .await
    .unwrap();

    assert!(outcome.records.contains(&PageRecord::failure(
        key_of(&broken),
        "/missing",
        FailureReason::Status(404)
    )));

    let result = aggregate(&outcome.records, config.crawler.page_limit);
    assert_eq!(result.consolidated[&key_of(&healthy)].len(), 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].reason, "404");
}

#[tokio::test]
async fn test_budget_never_exceeded_on_wide_site() {
    let server = MockServer::start().await;
    let links: String = (0..40)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(links, "text/html"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 7);
    let outcome = crawl(&config, vec![seed("Wide", &server)]).await.unwrap();

    assert_eq!(outcome.records.len(), 7);
    assert_eq!(outcome.reports[0].scheduled, 7);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 7);
}

#[tokio::test]
async fn test_pipeline_writes_outputs_and_reaggregates() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<a href="/about">about</a><a href="/gone">gone</a><a href="/doc.pdf">doc</a>"#
            .to_string(),
    )
    .await;
    mount_html(&server, "/about", "<p>about us</p>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "application/pdf"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 10);
    std::fs::write(
        &config.input.seeds_path,
        format!("Trust,URL\nPipeline Trust,{}/\n", server.uri()),
    )
    .unwrap();

    let (outcome, result) = run_pipeline(&config).await.unwrap();
    let domain = key_of(&server);

    assert_eq!(outcome.reports[0].skipped, 1);
    assert_eq!(result.consolidated[&domain]["/about"], "<p>about us</p>");
    assert_eq!(result.under_budget.len(), 1);
    assert_eq!(result.under_budget[0].pages, 2);

    let written = read_records(Path::new(&config.output.records_path)).unwrap();
    assert_eq!(written.len(), outcome.records.len());

    let errors: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output.errors_path).unwrap())
            .unwrap();
    assert_eq!(
        errors,
        serde_json::json!([{"domain": domain, "path": "/gone", "reason": "500"}])
    );

    std::fs::remove_file(&config.output.consolidated_path).unwrap();
    let (_, again) = reaggregate(&config).unwrap();
    assert_eq!(again, result);
    assert!(Path::new(&config.output.consolidated_path).exists());
}

#[tokio::test]
async fn test_unwritable_records_path_fails_before_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), 5);
    config.output.records_path = dir.path().join("missing/trusts.jsonl").display().to_string();

    let result = crawl(&config, vec![seed("Trust", &server)]).await;
    assert!(matches!(result, Err(trust_crawler::CrawlError::Io(_))));
}
