use installdata_lib::check::{CheckOptions, UrlIndex};
use installdata_lib::key_path;
use installdata_lib::reachability::{ProbeConfig, ProbeFailure, ReachabilityChecker};
use installdata_lib::ValidationReport;
use std::time::{Duration, Instant};
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/installData.json");

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_config() -> ProbeConfig {
    ProbeConfig {
        request_timeout: Duration::from_millis(500),
        backoff_min: Duration::from_millis(1),
        backoff_max: Duration::from_millis(5),
        ..ProbeConfig::default()
    }
}

fn checker(config: ProbeConfig) -> ReachabilityChecker {
    ReachabilityChecker::new(config).unwrap()
}

fn index_of(urls: &[&str]) -> UrlIndex {
    let mut index = UrlIndex::default();
    for (i, url) in urls.iter().enumerate() {
        index.insert(url, key_path!["mods", 0usize, "submods", 0usize, "files", i, "url"]);
    }
    index
}

#[tokio::test]
async fn test_partial_content_is_reachable() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rikachama/voices.7z"))
        .and(header("range", "bytes=0-1023"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![0u8; 1024]))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/rikachama/voices.7z", server.uri());
    let report = checker(fast_config()).check_all(&index_of(&[&url])).await;

    assert!(report.is_success());
    assert_eq!(report.reachable.len(), 1);
    let outcome = report.outcome(&url).unwrap();
    assert_eq!(outcome.status, 206);
    assert_eq!(outcome.bytes_read, 1024);
    assert!(!outcome.aborted);
    assert_eq!(outcome.redirected_to, None);
}

#[tokio::test]
async fn test_ignored_range_is_still_reachable() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64 * 1024]))
        .mount(&server)
        .await;

    let url = format!("{}/big.zip", server.uri());
    let config = fast_config();
    let limit = config.oversize_limit();
    let report = checker(config).check_all(&index_of(&[&url])).await;

    assert!(report.is_success());
    let outcome = report.outcome(&url).unwrap();
    assert_eq!(outcome.status, 200);
    assert!(outcome.aborted);
    assert!(outcome.bytes_read <= limit);
}

#[tokio::test]
async fn test_not_found_is_unreachable() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.7z"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/missing.7z", server.uri());
    let report = checker(fast_config()).check_all(&index_of(&[&url])).await;

    assert!(!report.is_success());
    let unreachable = report.find(&url).unwrap();
    assert_eq!(unreachable.failure, ProbeFailure::UnexpectedStatus { status: 404 });
    assert_eq!(
        unreachable.to_string(),
        format!("Failed to download {}: response code was 404", url)
    );
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/busy.7z", server.uri());
    let report = checker(fast_config()).check_all(&index_of(&[&url])).await;

    assert_eq!(
        report.find(&url).unwrap().failure,
        ProbeFailure::UnexpectedStatus { status: 503 }
    );
}

#[tokio::test]
async fn test_timeouts_are_retried_until_budget_is_spent() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.7z"))
        .respond_with(ResponseTemplate::new(206).set_delay(Duration::from_secs(2)))
        .expect(8)
        .mount(&server)
        .await;

    let config = ProbeConfig {
        request_timeout: Duration::from_millis(100),
        ..fast_config()
    };
    let url = format!("{}/slow.7z", server.uri());
    let report = checker(config).check_all(&index_of(&[&url])).await;

    assert_eq!(
        report.find(&url).unwrap().failure,
        ProbeFailure::TimedOut { attempts: 8 }
    );
}

#[tokio::test]
async fn test_redirect_is_followed_once() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ui.php"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/files/ui-win.7z"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/ui-win.7z"))
        .and(header("range", "bytes=0-1023"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![1u8; 1024]))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/ui.php?chapter=onikakushi&os=win", server.uri());
    let report = checker(fast_config()).check_all(&index_of(&[&url])).await;

    assert!(report.is_success(), "{:?}", report.unreachable);
    let target = report.outcome(&url).unwrap().redirected_to.clone().unwrap();
    assert_eq!(target, format!("{}/files/ui-win.7z", server.uri()));
}

#[tokio::test]
async fn test_second_redirect_is_not_followed() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/b"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/c"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(206))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}/a", server.uri());
    let report = checker(fast_config()).check_all(&index_of(&[&url])).await;

    assert_eq!(
        report.find(&url).unwrap().failure,
        ProbeFailure::UnexpectedStatus { status: 301 }
    );
}

#[tokio::test]
async fn test_shared_url_is_probed_once_and_lists_every_reference() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.7z"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/gone.7z", server.uri());
    let report = checker(fast_config()).check_all(&index_of(&[&url, &url, &url])).await;

    let unreachable = report.find(&url).unwrap();
    assert_eq!(unreachable.paths.len(), 3);
    assert_eq!(
        unreachable.paths[2],
        key_path!["mods", 0usize, "submods", 0usize, "files", 2usize, "url"]
    );
}

#[tokio::test]
async fn test_many_urls_on_one_host() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(206)
                .set_body_bytes(vec![0u8; 1024])
                .set_delay(Duration::from_millis(20)),
        )
        .expect(24)
        .mount(&server)
        .await;

    let urls: Vec<String> = (0..24)
        .map(|i| format!("{}/scripts/{}.7z", server.uri(), i))
        .collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let report = checker(fast_config()).check_all(&index_of(&refs)).await;

    assert!(report.is_success());
    assert_eq!(report.reachable.len(), 24);
}

#[tokio::test]
async fn test_connections_per_host_are_capped() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(206).set_delay(Duration::from_millis(200)))
        .expect(6)
        .mount(&server)
        .await;

    let urls: Vec<String> = (0..6)
        .map(|i| format!("{}/voices/{}.7z", server.uri(), i))
        .collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let config = ProbeConfig {
        max_connections_per_host: 2,
        max_in_flight: 8,
        request_timeout: Duration::from_secs(5),
        ..fast_config()
    };

    let started = Instant::now();
    let report = checker(config).check_all(&index_of(&refs)).await;
    let elapsed = started.elapsed();

    assert!(report.is_success());
    // six requests two at a time take at least three full delays
    assert!(elapsed >= Duration::from_millis(600), "finished in {:?}", elapsed);
}

#[tokio::test]
async fn test_full_run_against_fixture() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/umineko/question/exe-mg.7z"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![0u8; 1024]))
        .mount(&server)
        .await;

    let listing = FIXTURE
        .replace("https://07th-mod.com", &server.uri())
        .replace("http://07th-mod.com", &server.uri());

    let mut report = ValidationReport::run("installData.json", listing.as_bytes(), &CheckOptions::default());
    assert!(report.is_success());

    report.probe(&checker(fast_config())).await;
    assert!(!report.is_success());

    let lines = report.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("exe-mg.7z: response code was 404"));
    assert!(lines[0].contains("mods → 1 → submods → 0 → fileOverrides → 1 → url"));
}
