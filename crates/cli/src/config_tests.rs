#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use bolt_wrapper_compare::DEFAULT_NOISE_PATTERNS;
use rstest::rstest;

const MINIMAL: &str = "
[config]
base_bolt = /opt/base/llvm-bolt.real
cmp_bolt = /opt/cmp/llvm-bolt
";

#[test]
fn minimal_settings_use_defaults() {
    let settings = Settings::parse(MINIMAL).unwrap();
    assert_eq!(settings.base_bolt, PathBuf::from("/opt/base/llvm-bolt.real"));
    assert_eq!(settings.cmp_bolt, PathBuf::from("/opt/cmp/llvm-bolt"));
    assert!(!settings.verbose);
    assert!(!settings.keep_tmp);
    assert!(!settings.no_minimize);
    assert!(!settings.run_sequentially);
    assert!(!settings.compare_output);
    assert!(!settings.skip_binary_cmp);
    assert!(!settings.strict_line_count);
    assert_eq!(settings.timing_file, PathBuf::from(DEFAULT_TIMING_FILE));
    assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert_eq!(settings.time_tool, PathBuf::from(DEFAULT_TIME_TOOL));
    assert_eq!(settings.readelf, None);
    assert_eq!(settings.noise.len(), DEFAULT_NOISE_PATTERNS.len());
}

#[test]
fn bare_keys_are_true() {
    let text = format!("{MINIMAL}verbose\nkeep_tmp\nno_minimize\nrun_sequentially\ncompare_output\nskip_binary_cmp\nstrict_line_count\n");
    let settings = Settings::parse(&text).unwrap();
    assert!(settings.verbose);
    assert!(settings.keep_tmp);
    assert!(settings.no_minimize);
    assert!(settings.run_sequentially);
    assert!(settings.compare_output);
    assert!(settings.skip_binary_cmp);
    assert!(settings.strict_line_count);
}

#[rstest]
#[case("yes", true)]
#[case("On", true)]
#[case("1", true)]
#[case("TRUE", true)]
#[case("no", false)]
#[case("off", false)]
#[case("0", false)]
#[case("False", false)]
fn boolean_values(#[case] value: &str, #[case] expected: bool) {
    let text = format!("{MINIMAL}compare_output = {value}\n");
    assert_eq!(Settings::parse(&text).unwrap().compare_output, expected);
}

#[test]
fn empty_value_counts_as_bare_key() {
    let text = format!("{MINIMAL}keep_tmp =\n");
    assert!(Settings::parse(&text).unwrap().keep_tmp);
}

#[test]
fn invalid_boolean_is_rejected() {
    let text = format!("{MINIMAL}verbose = maybe\n");
    let err = Settings::parse(&text).unwrap_err();
    assert!(
        matches!(err, SettingsError::InvalidBool { key: "verbose", ref value } if value == "maybe"),
        "{err:?}"
    );
}

#[test]
fn optional_values_are_read() {
    let text = format!(
        "{MINIMAL}timing_file = timing1.log\ntimeout: 60\ntime_tool = /usr/local/bin/gtime\nreadelf = /usr/bin/readelf\n"
    );
    let settings = Settings::parse(&text).unwrap();
    assert_eq!(settings.timing_file, PathBuf::from("timing1.log"));
    assert_eq!(settings.timeout, Duration::from_secs(60));
    assert_eq!(settings.time_tool, PathBuf::from("/usr/local/bin/gtime"));
    assert_eq!(
        settings.header_dumper(),
        HeaderDumper::External(PathBuf::from("/usr/bin/readelf"))
    );
}

#[test]
fn invalid_timeout_is_rejected() {
    let text = format!("{MINIMAL}timeout = forever\n");
    assert!(matches!(
        Settings::parse(&text).unwrap_err(),
        SettingsError::InvalidNumber { key: "timeout", .. }
    ));
}

#[test]
fn keys_are_case_insensitive_and_last_wins() {
    let text = format!("{MINIMAL}VERBOSE = yes\nverbose = no\n");
    assert!(!Settings::parse(&text).unwrap().verbose);
}

#[test]
fn comments_are_ignored() {
    let text = "# leading comment\n[config]\n; base build\nbase_bolt = /a\n# cmp build\ncmp_bolt = /b\n";
    let settings = Settings::parse(text).unwrap();
    assert_eq!(settings.base_bolt, PathBuf::from("/a"));
}

#[rstest]
#[case("[config]\ncmp_bolt = /b\n", "base_bolt")]
#[case("[config]\nbase_bolt = /a\n", "cmp_bolt")]
fn missing_required_key(#[case] text: &str, #[case] key: &str) {
    match Settings::parse(text).unwrap_err() {
        SettingsError::MissingKey(missing) => assert_eq!(missing, key),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn required_key_without_value() {
    let err = Settings::parse("[config]\nbase_bolt\ncmp_bolt = /b\n").unwrap_err();
    assert!(matches!(err, SettingsError::MissingValue("base_bolt")), "{err:?}");
}

#[test]
fn missing_config_section() {
    let err = Settings::parse("[other]\nbase_bolt = /a\n").unwrap_err();
    assert!(matches!(err, SettingsError::MissingSection), "{err:?}");
}

#[test]
fn entries_outside_config_are_ignored() {
    let err = Settings::parse("base_bolt = /a\n[config]\ncmp_bolt = /b\n").unwrap_err();
    assert!(matches!(err, SettingsError::MissingKey("base_bolt")), "{err:?}");
}

#[test]
fn indented_line_continues_value() {
    let text = "[config]\nbase_bolt = /opt/base\n    /llvm-bolt\ncmp_bolt = /b\n";
    let settings = Settings::parse(text).unwrap();
    let base = settings.base_bolt.display().to_string();
    assert!(base.starts_with("/opt/base"), "{base}");
    assert!(base.ends_with("/llvm-bolt"), "{base}");
    assert_eq!(settings.cmp_bolt, PathBuf::from("/b"));
}

#[test]
fn skip_match_patterns_keep_delimiters() {
    let text = format!("{MINIMAL}\n[skip_match]\nelapsed = ^BOLT-INFO: elapsed = [0-9.]+s\n");
    let settings = Settings::parse(&text).unwrap();
    assert_eq!(settings.noise.len(), DEFAULT_NOISE_PATTERNS.len() + 1);
    assert_eq!(
        settings.noise.iter().last(),
        Some("^BOLT-INFO: elapsed = [0-9.]+s")
    );
    assert!(settings
        .log_comparator()
        .compare("BOLT-INFO: elapsed = 1.5s\n", "BOLT-INFO: elapsed = 2.25s\n", 0)
        .is_none());
}

#[test]
fn skip_match_patterns_are_ordered_by_name() {
    let text = format!("{MINIMAL}\n[skip_match]\nzz = ^BOLT-INFO: b\naa = ^BOLT-INFO: a\n");
    let settings = Settings::parse(&text).unwrap();
    let extra: Vec<&str> = settings
        .noise
        .iter()
        .skip(DEFAULT_NOISE_PATTERNS.len())
        .collect();
    assert_eq!(extra, vec!["^BOLT-INFO: a", "^BOLT-INFO: b"]);
}

#[test]
fn skip_match_entry_without_pattern() {
    let text = format!("{MINIMAL}\n[skip_match]\nelapsed\n");
    let err = Settings::parse(&text).unwrap_err();
    assert!(
        matches!(err, SettingsError::PatternWithoutValue(ref name) if name == "elapsed"),
        "{err:?}"
    );
}

#[test]
fn invalid_skip_match_pattern() {
    let text = format!("{MINIMAL}\n[skip_match]\nbroken = ([unclosed\n");
    assert!(matches!(
        Settings::parse(&text).unwrap_err(),
        SettingsError::InvalidPattern { .. }
    ));
}

#[test]
fn strict_line_count_selects_policy() {
    let text = format!("{MINIMAL}strict_line_count\n");
    let comparator = Settings::parse(&text).unwrap().log_comparator();
    assert_eq!(comparator.policy(), LineCountPolicy::Strict);
    assert_eq!(
        Settings::parse(MINIMAL).unwrap().log_comparator().policy(),
        LineCountPolicy::Lenient
    );
}

#[test]
fn load_from_dir_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, SettingsError::NotFound { .. }));
    assert!(err.to_string().contains(SETTINGS_FILE));
}

#[test]
fn load_from_dir_reads_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(SETTINGS_FILE), MINIMAL).unwrap();
    let settings = Settings::load_from_dir(dir.path()).unwrap();
    assert_eq!(settings.cmp_bolt, PathBuf::from("/opt/cmp/llvm-bolt"));
}

#[test]
#[serial_test::serial]
fn resolve_applies_environment_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let explicit = dir.path().join("other.ini");
    std::fs::write(&explicit, MINIMAL).unwrap();

    std::env::set_var(env::BOLT_WRAPPER_CONFIG, &explicit);
    std::env::set_var(env::BOLT_WRAPPER_TIMEOUT_SECS, "5");
    std::env::set_var(env::BOLT_WRAPPER_VERBOSE, "1");
    let result = Settings::resolve(dir.path());
    std::env::remove_var(env::BOLT_WRAPPER_CONFIG);
    std::env::remove_var(env::BOLT_WRAPPER_TIMEOUT_SECS);
    std::env::remove_var(env::BOLT_WRAPPER_VERBOSE);

    let settings = result.unwrap();
    assert_eq!(settings.timeout, Duration::from_secs(5));
    assert!(settings.verbose);
}

#[test]
#[serial_test::serial]
fn resolve_reads_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::env::remove_var(env::BOLT_WRAPPER_CONFIG);
    assert!(matches!(
        Settings::resolve(dir.path()).unwrap_err(),
        SettingsError::NotFound { .. }
    ));

    std::fs::write(dir.path().join(SETTINGS_FILE), MINIMAL).unwrap();
    assert!(Settings::resolve(dir.path()).is_ok());
}
