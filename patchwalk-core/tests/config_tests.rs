// Tests for run configuration

use chrono::NaiveDate;
use patchwalk_core::config::{DEFAULT_MAX_DEPTH, RunConfig, default_repository, parse_after_date};

#[test]
fn test_parse_after_date_valid() {
    assert_eq!(
        parse_after_date("2019-11-10").unwrap(),
        NaiveDate::from_ymd_opt(2019, 11, 10).unwrap()
    );
    assert_eq!(
        parse_after_date("2000-02-29").unwrap(),
        NaiveDate::from_ymd_opt(2000, 2, 29).unwrap()
    );
}

#[test]
fn test_parse_after_date_rejects_loose_shapes() {
    for value in [
        "2019-1-05",
        "2019-11-5",
        "19-11-10",
        "2019/11/10",
        "2019-11-10T00:00:00",
        " 2019-11-10",
        "3019-11-10",
        "",
        "yesterday",
    ] {
        assert!(parse_after_date(value).is_err(), "{} should be rejected", value);
    }
}

#[test]
fn test_parse_after_date_rejects_impossible_dates() {
    assert!(parse_after_date("2019-13-01").is_err());
    assert!(parse_after_date("2019-02-30").is_err());
    assert!(parse_after_date("2019-00-10").is_err());
    assert!(parse_after_date("2019-11-32").is_err());
}

#[test]
fn test_parse_after_date_error_mentions_example() {
    let err = parse_after_date("nov 10").unwrap_err();
    assert!(err.contains("2019-11-10"));
}

#[test]
fn test_run_config_defaults() {
    let config = RunConfig::new("https://bugzilla.mozilla.org/show_bug.cgi?id=1566221");

    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.max_depth, 1);
    assert!(config.after.is_none());
    assert!(!config.disable_cache);
    assert!(config.show_progress());
    assert_eq!(config.repository, default_repository());
    assert_eq!(config.diffstat, "diffstat");
}

#[test]
fn test_headless_hides_progress() {
    let mut config = RunConfig::new("https://bugzilla.mozilla.org/show_bug.cgi?id=1");
    config.headless = true;
    assert!(!config.show_progress());
}
