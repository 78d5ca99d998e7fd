//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use website_checker::config::{CrawlConfig, CrawlMode};
use website_checker::output::{
    ErrorKind, MemoryProgress, MemorySink, ResourceRecord, SqliteSink, TerminationReason,
};
use website_checker::state::ResourceStatus;
use website_checker::{run_crawl, ConfigError, CrawlEngine, CrawlError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawl configuration suitable for a local mock server
fn test_config() -> CrawlConfig {
    CrawlConfig {
        user_agent: "TestBot/1.0".to_string(),
        worker_count: 4,
        timeout: 5,
        ..Default::default()
    }
}

/// An HTML page with a unique heading (so bodies never collide) and the given markup
fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
            title, title, body
        ),
        "text/html",
    )
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a page that must never be requested
async fn mount_never(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(route, ""))
        .expect(0)
        .mount(server)
        .await;
}

fn paths(records: &[ResourceRecord]) -> Vec<String> {
    let mut paths: Vec<String> = records
        .iter()
        .map(|r| {
            let url = url::Url::parse(&r.normalized_url).unwrap();
            match url.query() {
                Some(q) => format!("{}?{}", url.path(), q),
                None => url.path().to_string(),
            }
        })
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_full_crawl_depth_one() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/a">A</a>
               <a href="/b">B</a>
               <a href="/c">C</a>
               <a href="http://external.invalid/page">External</a>"#,
        ),
    )
    .await;
    mount_get(&server, "/a", html_page("A", r#"<a href="/deeper">Deeper</a>"#)).await;
    mount_get(&server, "/b", html_page("B", "")).await;
    mount_get(&server, "/c", html_page("C", "")).await;
    mount_never(&server, "/deeper").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        max_depth: 1,
        ..test_config()
    };

    let summary = run_crawl(&server.uri(), config, sink.clone()).await.unwrap();
    let records = sink.records();

    assert_eq!(records.len(), 4);
    assert_eq!(paths(&records), vec!["/", "/a", "/b", "/c"]);
    assert!(records.iter().all(|r| r.depth <= 1));
    assert!(records.iter().all(|r| !r.is_external));
    assert!(records.iter().all(|r| r.status == ResourceStatus::Ok));

    assert_eq!(summary.termination, TerminationReason::Completed);
    assert_eq!(summary.records_emitted, 4);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.max_depth_seen, 1);
    assert_eq!(summary.visited, 4);
}

#[tokio::test]
async fn test_external_links_followed_when_enabled() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let seed = format!("http://localhost:{}/", port);
    let external = format!("http://127.0.0.1:{}/elsewhere", port);

    // One origin per host name, each asked for robots.txt exactly once
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("User-agent: *\nAllow: /", "text/plain"))
        .expect(2)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            &format!(r#"<a href="/local">Local</a><a href="{}">Elsewhere</a>"#, external),
        ),
    )
    .await;
    mount_get(&server, "/local", html_page("Local", "")).await;
    mount_get(&server, "/elsewhere", html_page("Elsewhere", "")).await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        follow_external_links: true,
        ..test_config()
    };

    let summary = run_crawl(&seed, config, sink.clone()).await.unwrap();

    let record = sink.find(&external).unwrap();
    assert!(record.is_external);
    assert_eq!(record.domain, "127.0.0.1");
    assert_eq!(record.depth, 1);
    assert_eq!(record.status, ResourceStatus::Ok);

    let local = sink.find(&format!("http://localhost:{}/local", port)).unwrap();
    assert!(!local.is_external);
    assert_eq!(local.domain, "localhost");

    assert_eq!(sink.len(), 3);
    assert_eq!(summary.base_domain, "localhost");
}

#[tokio::test]
async fn test_records_carry_discovery_metadata() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page("Home", r#"<a href="./about/../about">About</a><img src="/logo.png">"#),
    )
    .await;
    mount_get(&server, "/about", html_page("About", "")).await;
    mount_get(
        &server,
        "/logo.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
    )
    .await;

    let sink = Arc::new(MemorySink::new());
    let start = format!("{}/", server.uri());
    run_crawl(&start, test_config(), sink.clone()).await.unwrap();

    let root = sink.find(&start).unwrap();
    assert_eq!(root.depth, 0);
    assert!(root.parent_url.is_none());
    assert!(root.link_source.is_none());
    assert_eq!(root.mime_type.as_deref(), Some("text/html"));
    assert!(root.content_hash.is_some());

    let about = sink.find(&format!("{}/about", server.uri())).unwrap();
    assert_eq!(about.depth, 1);
    assert_eq!(about.parent_url.as_deref(), Some(start.as_str()));
    assert_eq!(about.status_code, Some(200));

    let logo = sink.find(&format!("{}/logo.png", server.uri())).unwrap();
    assert_eq!(logo.byte_length, 4);
    assert_eq!(logo.mime_type.as_deref(), Some("image/png"));
    assert_eq!(logo.resource_type.as_str(), "image");
}

#[tokio::test]
async fn test_max_urls_one_emits_single_record() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page("Home", r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    mount_never(&server, "/a").await;
    mount_never(&server, "/b").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        max_urls: 1,
        ..test_config()
    };

    let summary = run_crawl(&server.uri(), config, sink.clone()).await.unwrap();

    assert_eq!(sink.len(), 1);
    assert_eq!(summary.termination, TerminationReason::LimitReached);
    assert_eq!(summary.budget_rejections, 2);
    assert!(summary.visited + summary.queued_remaining <= 1);
}

#[tokio::test]
async fn test_budget_bounds_visited_set() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_get(&server, "/", html_page("Home", &links)).await;
    for i in 0..20 {
        let route = format!("/p{}", i);
        mount_get(&server, &route, html_page(&route, "")).await;
    }

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        max_urls: 5,
        ..test_config()
    };

    let summary = run_crawl(&server.uri(), config, sink.clone()).await.unwrap();

    assert_eq!(sink.len(), 5);
    assert_eq!(summary.visited, 5);
    assert_eq!(summary.termination, TerminationReason::LimitReached);
}

#[tokio::test]
async fn test_duplicate_content_is_not_expanded() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/dir1/page">One</a><a href="/dir2/page">Two</a>"#,
        ),
    )
    .await;

    // Byte-identical bodies with a relative link that resolves differently per directory
    let same = html_page("Same", r#"<a href="next">Next</a>"#);
    mount_get(&server, "/dir1/page", same.clone()).await;
    mount_get(&server, "/dir2/page", same).await;
    mount_get(&server, "/dir1/next", html_page("Next 1", "")).await;
    mount_get(&server, "/dir2/next", html_page("Next 2", "")).await;

    let sink = Arc::new(MemorySink::new());
    let summary = run_crawl(&server.uri(), test_config(), sink.clone())
        .await
        .unwrap();
    let records = sink.records();

    let duplicates: Vec<&ResourceRecord> = records.iter().filter(|r| r.is_duplicate).collect();
    assert_eq!(duplicates.len(), 1);
    let duplicate = duplicates[0];
    assert!(duplicate.canonical_url.is_some());
    assert_ne!(
        duplicate.canonical_url.as_deref(),
        Some(duplicate.normalized_url.as_str())
    );

    let next_pages = records
        .iter()
        .filter(|r| r.normalized_url.ends_with("/next"))
        .count();
    assert_eq!(next_pages, 1);

    assert_eq!(summary.duplicates, 1);
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_single_mode_fetches_only_start() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page("Home", r#"<a href="/a">A</a><img src="/img.png">"#),
    )
    .await;
    mount_never(&server, "/a").await;
    mount_never(&server, "/img.png").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        mode: CrawlMode::Single,
        ..test_config()
    };

    let summary = run_crawl(&server.uri(), config, sink.clone()).await.unwrap();

    assert_eq!(sink.len(), 1);
    assert_eq!(summary.termination, TerminationReason::Completed);
}

#[tokio::test]
async fn test_design_mode_extracts_only_from_start() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            r#"<link rel="stylesheet" href="/style.css"><a href="/a">A</a>"#,
        ),
    )
    .await;
    mount_get(
        &server,
        "/style.css",
        ResponseTemplate::new(200).set_body_raw("body { color: black; }", "text/css"),
    )
    .await;
    mount_get(&server, "/a", html_page("A", r#"<a href="/b">B</a>"#)).await;
    mount_never(&server, "/b").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        mode: CrawlMode::Design,
        max_depth: 5,
        ..test_config()
    };

    run_crawl(&server.uri(), config, sink.clone()).await.unwrap();
    let records = sink.records();

    assert_eq!(paths(&records), vec!["/", "/a", "/style.css"]);
    let css = records
        .iter()
        .find(|r| r.normalized_url.ends_with("/style.css"))
        .unwrap();
    assert_eq!(css.resource_type.as_str(), "css");
}

#[tokio::test]
async fn test_path_mode_restricts_prefix() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/docs/",
        html_page(
            "Docs",
            r#"<a href="/docs/intro">Intro</a><a href="/blog/post">Blog</a>"#,
        ),
    )
    .await;
    mount_get(&server, "/docs/intro", html_page("Intro", "")).await;
    mount_never(&server, "/blog/post").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        mode: CrawlMode::Path,
        path_restriction: Some("/docs".to_string()),
        ..test_config()
    };

    run_crawl(&format!("{}/docs/", server.uri()), config, sink.clone())
        .await
        .unwrap();

    assert_eq!(paths(&sink.records()), vec!["/docs/", "/docs/intro"]);
}

#[tokio::test]
async fn test_regex_exclusive_filters_tracking_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(query_param("utm_source", "x"))
        .respond_with(html_page("Tracked", ""))
        .expect(0)
        .mount(&server)
        .await;

    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/page?utm_source=x">Tracked</a>
               <a href="/page?id=2">Page</a>
               <a href="/other">Other</a>"#,
        ),
    )
    .await;
    mount_get(&server, "/page", html_page("Page", "")).await;
    mount_get(&server, "/other", html_page("Other", "")).await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        mode: CrawlMode::Regex,
        regex_pattern: Some("utm_".to_string()),
        regex_is_inclusive: false,
        ..test_config()
    };

    run_crawl(&server.uri(), config, sink.clone()).await.unwrap();
    let records = sink.records();

    assert_eq!(paths(&records), vec!["/", "/other", "/page?id=2"]);
    assert!(records.iter().all(|r| !r.normalized_url.contains("utm_")));
}

#[tokio::test]
async fn test_robots_disallow_is_honored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("User-agent: *\nDisallow: /private", "text/plain"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#,
        ),
    )
    .await;
    mount_get(&server, "/public", html_page("Public", "")).await;
    mount_never(&server, "/private/secret").await;

    let sink = Arc::new(MemorySink::new());
    let summary = run_crawl(&server.uri(), test_config(), sink.clone())
        .await
        .unwrap();

    let blocked = sink
        .find(&format!("{}/private/secret", server.uri()))
        .unwrap();
    assert_eq!(blocked.status, ResourceStatus::Blocked);
    assert_eq!(
        blocked.error.as_ref().map(|e| e.kind),
        Some(ErrorKind::RobotsDisallowed)
    );
    assert_eq!(blocked.status_code, None);

    assert_eq!(
        sink.find(&format!("{}/public", server.uri())).unwrap().status,
        ResourceStatus::Ok
    );
    assert_eq!(summary.robots_blocked, 1);
}

#[tokio::test]
async fn test_robots_redirect_followed_when_page_redirects_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/real-robots.txt"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/real-robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("User-agent: *\nDisallow: /private", "text/plain"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/",
        html_page("Home", r#"<a href="/private/x">Private</a>"#),
    )
    .await;
    mount_never(&server, "/private/x").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        follow_redirects: false,
        ..test_config()
    };

    run_crawl(&server.uri(), config, sink.clone()).await.unwrap();

    let private = sink.find(&format!("{}/private/x", server.uri())).unwrap();
    assert_eq!(private.status, ResourceStatus::Blocked);
    assert_eq!(private.status_code, None);
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("User-agent: *\nDisallow: /", "text/plain"),
        )
        .expect(0)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/",
        html_page("Home", r#"<a href="/private/secret">Secret</a>"#),
    )
    .await;
    mount_get(&server, "/private/secret", html_page("Secret", "")).await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        respect_robots_txt: false,
        ..test_config()
    };

    run_crawl(&server.uri(), config, sink.clone()).await.unwrap();

    assert_eq!(sink.len(), 2);
    assert_eq!(sink.count_by_status(ResourceStatus::Ok), 2);
}

#[tokio::test]
async fn test_robots_fetched_once_per_origin() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("User-agent: *\nAllow: /", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_get(&server, "/", html_page("Home", &links)).await;
    for i in 0..10 {
        let route = format!("/p{}", i);
        mount_get(&server, &route, html_page(&route, "")).await;
    }

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        worker_count: 8,
        ..test_config()
    };

    run_crawl(&server.uri(), config, sink.clone()).await.unwrap();
    assert_eq!(sink.len(), 11);
}

#[tokio::test]
async fn test_robots_unavailable_allows_all() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_get(&server, "/", html_page("Home", r#"<a href="/a">A</a>"#)).await;
    mount_get(&server, "/a", html_page("A", "")).await;

    let sink = Arc::new(MemorySink::new());
    run_crawl(&server.uri(), test_config(), sink.clone())
        .await
        .unwrap();

    assert_eq!(sink.count_by_status(ResourceStatus::Ok), 2);
}

#[tokio::test]
async fn test_failures_are_recorded_and_isolated() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/missing">Missing</a><a href="/broken">Broken</a><a href="/fine">Fine</a>"#,
        ),
    )
    .await;
    mount_get(&server, "/missing", ResponseTemplate::new(404)).await;
    mount_get(&server, "/broken", ResponseTemplate::new(500)).await;
    mount_get(&server, "/fine", html_page("Fine", "")).await;

    let sink = Arc::new(MemorySink::new());
    let summary = run_crawl(&server.uri(), test_config(), sink.clone())
        .await
        .unwrap();

    let missing = sink.find(&format!("{}/missing", server.uri())).unwrap();
    assert_eq!(missing.status, ResourceStatus::NotFound);
    assert_eq!(missing.status_code, Some(404));
    assert_eq!(
        missing.error.as_ref().map(|e| e.kind),
        Some(ErrorKind::HttpStatus)
    );

    let broken = sink.find(&format!("{}/broken", server.uri())).unwrap();
    assert_eq!(broken.status, ResourceStatus::Error);
    assert_eq!(broken.status_code, Some(500));

    assert_eq!(
        sink.find(&format!("{}/fine", server.uri())).unwrap().status,
        ResourceStatus::Ok
    );
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.termination, TerminationReason::Completed);
}

#[tokio::test]
async fn test_redirect_is_followed_and_recorded() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html_page("Home", r#"<a href="/old">Old</a>"#)).await;
    mount_get(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/new"),
    )
    .await;
    mount_get(&server, "/new", html_page("New", "")).await;

    let sink = Arc::new(MemorySink::new());
    run_crawl(&server.uri(), test_config(), sink.clone())
        .await
        .unwrap();

    let old = sink.find(&format!("{}/old", server.uri())).unwrap();
    assert_eq!(old.status, ResourceStatus::Redirected);
    assert_eq!(old.status_code, Some(200));
    assert_eq!(old.final_url, Some(format!("{}/new", server.uri())));
}

#[tokio::test]
async fn test_redirect_not_followed_when_disabled() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html_page("Home", r#"<a href="/old">Old</a>"#)).await;
    mount_get(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/new"),
    )
    .await;
    mount_never(&server, "/new").await;

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        follow_redirects: false,
        ..test_config()
    };
    run_crawl(&server.uri(), config, sink.clone()).await.unwrap();

    let old = sink.find(&format!("{}/old", server.uri())).unwrap();
    assert_eq!(old.status, ResourceStatus::Redirected);
    assert_eq!(old.status_code, Some(301));
    assert_eq!(old.error.as_ref().map(|e| e.kind), Some(ErrorKind::Redirect));
}

#[tokio::test]
async fn test_cancellation_stops_crawl() {
    let server = MockServer::start().await;

    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/slow/{}">Slow</a>"#, i))
        .collect();
    mount_get(&server, "/", html_page("Home", &links)).await;
    for i in 0..5 {
        let route = format!("/slow/{}", i);
        mount_get(
            &server,
            &route,
            html_page(&route, "").set_delay(Duration::from_millis(500)),
        )
        .await;
    }

    let sink = Arc::new(MemorySink::new());
    let config = CrawlConfig {
        worker_count: 1,
        ..test_config()
    };
    let engine = CrawlEngine::new(config, sink.clone()).unwrap();

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let summary = engine.run(&server.uri()).await.unwrap();

    assert_eq!(summary.termination, TerminationReason::Cancelled);
    assert!(summary.records_emitted < 6);
    assert!(summary.queued_remaining > 0);
    assert_eq!(sink.len() as u64, summary.records_emitted);
}

#[tokio::test]
async fn test_invalid_regex_fails_before_crawling() {
    let config = CrawlConfig {
        mode: CrawlMode::Regex,
        regex_pattern: Some("([unclosed".to_string()),
        ..test_config()
    };

    let result = run_crawl("http://unused.invalid/", config, Arc::new(MemorySink::new())).await;
    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::InvalidPattern(_)))
    ));
}

#[tokio::test]
async fn test_sqlite_sink_receives_records() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html_page("Home", r#"<a href="/a">A</a>"#)).await;
    mount_get(&server, "/a", html_page("A", "")).await;

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(SqliteSink::open(&dir.path().join("crawl.db")).unwrap());

    let summary = run_crawl(&server.uri(), test_config(), sink.clone())
        .await
        .unwrap();
    sink.record_summary(&summary).unwrap();

    assert_eq!(sink.count().unwrap(), 2);
    assert_eq!(sink.count_by_status(ResourceStatus::Ok).unwrap(), 2);
}

#[tokio::test]
async fn test_progress_updates() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html_page("Home", r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    mount_get(&server, "/a", html_page("A", "")).await;
    mount_get(&server, "/b", html_page("B", "")).await;

    let sink = Arc::new(MemorySink::new());
    let progress = Arc::new(MemoryProgress::new());
    let engine = CrawlEngine::new(test_config(), sink.clone())
        .unwrap()
        .with_progress(progress.clone());

    engine.run(&server.uri()).await.unwrap();

    let updates = progress.updates();
    assert_eq!(updates.len(), 3);
    let last = updates
        .iter()
        .max_by_key(|p| p.records_emitted)
        .unwrap();
    assert_eq!(last.records_emitted, 3);
    assert_eq!(last.max_urls, 100);
    assert!(updates.iter().all(|p| p.visited + p.queued <= p.max_urls));
}
