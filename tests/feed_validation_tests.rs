//! Integration tests for Feed defaulting and validation
//!
//! These tests verify that the admission helpers correctly accept valid specs
//! and reject invalid ones.

use putio_feed_operator::crd::{
    default_feed_spec, validate_feed_spec, AuthSecretRef, FeedSpec, DEFAULT_PARENT_DIR_ID,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn valid_feed_spec() -> FeedSpec {
    FeedSpec {
        title: "test-feed".to_string(),
        rss_source_url: "https://www.example.com/rss.xml".to_string(),
        parent_dir_id: None,
        delete_old_files: false,
        dont_process_whole_feed: false,
        keyword: "foo,bar".to_string(),
        unwanted_keywords: None,
        paused: false,
        auth_secret_ref: AuthSecretRef {
            name: "putio-token".to_string(),
            key: "token".to_string(),
        },
    }
}

// ============================================================================
// Defaulting Tests
// ============================================================================

#[test]
fn default_sets_root_parent_dir() {
    let spec = default_feed_spec(valid_feed_spec());
    assert_eq!(spec.parent_dir_id, Some(DEFAULT_PARENT_DIR_ID));
    assert!(!spec.paused);
    assert!(!spec.delete_old_files);
    assert!(!spec.dont_process_whole_feed);
}

#[test]
fn default_keeps_explicit_parent_dir() {
    let mut spec = valid_feed_spec();
    spec.parent_dir_id = Some(1234);

    assert_eq!(default_feed_spec(spec).parent_dir_id, Some(1234));
}

#[test]
fn default_is_idempotent() {
    let once = default_feed_spec(valid_feed_spec());
    let twice = default_feed_spec(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn omitted_flags_deserialize_to_false() {
    let spec: FeedSpec = serde_json::from_value(serde_json::json!({
        "title": "foo",
        "rssSourceUrl": "https://www.example.com/rss.xml",
        "keyword": "foo",
        "authSecretRef": { "name": "putio-token", "key": "token" }
    }))
    .unwrap();

    assert!(!spec.paused);
    assert!(!spec.delete_old_files);
    assert!(!spec.dont_process_whole_feed);
    assert_eq!(spec.parent_dir_id, None);
    assert!(validate_feed_spec(&default_feed_spec(spec)).is_ok());
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn valid_spec_passes_validation() {
    let result = validate_feed_spec(&valid_feed_spec());
    if let Err(e) = &result {
        panic!("Validation failed unexpectedly: {:?}", e);
    }
}

#[test]
fn empty_title_fails_validation() {
    let mut spec = valid_feed_spec();
    spec.title = "  ".to_string();

    let result = validate_feed_spec(&spec);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("title"));
}

#[test]
fn title_with_separator_fails_validation() {
    let mut spec = valid_feed_spec();
    spec.title = "movies|hd".to_string();

    let result = validate_feed_spec(&spec);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("'|'"));
}

#[test]
fn invalid_urls_fail_validation() {
    let invalid_urls = vec!["", "not a url", "www.example.com/rss", "/relative/rss.xml", "mailto:someone@example.com"];

    for url in invalid_urls {
        let mut spec = valid_feed_spec();
        spec.rss_source_url = url.to_string();

        let result = validate_feed_spec(&spec);
        assert!(result.is_err(), "URL '{}' should fail validation", url);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("RSS source URL"));
    }
}

#[test]
fn absolute_urls_pass_validation() {
    let valid_urls = vec![
        "https://www.example.com/rss.xml",
        "http://feeds.example.org/shows?format=rss",
        "https://example.com:8443/feed",
    ];

    for url in valid_urls {
        let mut spec = valid_feed_spec();
        spec.rss_source_url = url.to_string();
        assert!(
            validate_feed_spec(&spec).is_ok(),
            "URL '{}' should be valid",
            url
        );
    }
}

#[test]
fn empty_keyword_fails_validation() {
    let mut spec = valid_feed_spec();
    spec.keyword = String::new();

    let result = validate_feed_spec(&spec);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("keyword"));
}

#[test]
fn optional_exclusion_filter_passes_validation() {
    let mut spec = valid_feed_spec();
    spec.unwanted_keywords = Some("cam,ts".to_string());
    assert!(validate_feed_spec(&spec).is_ok());
}

#[test]
fn incomplete_auth_secret_ref_fails_validation() {
    let mut spec = valid_feed_spec();
    spec.auth_secret_ref.key = String::new();

    let result = validate_feed_spec(&spec);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("secret"));
}
