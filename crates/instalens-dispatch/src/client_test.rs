use super::*;

fn config() -> DispatchConfig {
    DispatchConfig {
        token: "ghp_test".to_string(),
        repo: "acme/scrapers".to_string(),
        workflow: "scraper.yml".to_string(),
        git_ref: "main".to_string(),
        poll_interval_secs: 6,
        max_polls: 3,
        timeout_secs: 30,
    }
}

fn test_client(base_url: &str) -> DispatchClient {
    DispatchClient::with_base_url(&config(), base_url)
        .expect("client construction should not fail")
}

#[test]
fn api_url_joins_repo_path() {
    let client = test_client("https://api.github.com");
    let url = client
        .api_url("repos/acme/scrapers/actions/workflows/scraper.yml/dispatches", &[])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.github.com/repos/acme/scrapers/actions/workflows/scraper.yml/dispatches"
    );
}

#[test]
fn api_url_keeps_base_path_prefix() {
    let client = test_client("https://ghe.example.com/api/v3/");
    let url = client
        .api_url("repos/acme/scrapers/actions/artifacts", &[("name", "x")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://ghe.example.com/api/v3/repos/acme/scrapers/actions/artifacts?name=x"
    );
}

#[test]
fn api_url_encodes_query_values() {
    let client = test_client("https://api.github.com");
    let url = client
        .api_url("repos/acme/scrapers/actions/artifacts", &[("name", "a b&c")])
        .unwrap();
    assert!(
        url.as_str().ends_with("name=a+b%26c"),
        "query param should be form-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = DispatchClient::with_base_url(&config(), "not a url");
    assert!(matches!(result, Err(DispatchError::InvalidBaseUrl { .. })));
}

#[test]
fn artifact_name_has_operator_and_short_suffix() {
    let name = artifact_name("ravi");
    let suffix = name
        .strip_prefix("scraped_data_ravi_")
        .expect("prefix should carry the operator");
    assert_eq!(suffix.len(), 6);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn artifact_name_is_unique_per_call() {
    assert_ne!(artifact_name("ravi"), artifact_name("ravi"));
}

#[test]
fn artifact_name_replaces_rejected_characters() {
    let name = artifact_name(" team/ravi k ");
    assert!(name.starts_with("scraped_data_team_ravi_k_"), "{name}");
}
