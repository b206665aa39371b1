#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use rstest::rstest;

#[rstest]
#[case("BOLT-INFO: done\n12.34 567890\n", Some(("12.34", "567890")))]
#[case("0.00 1024", Some(("0.00", "1024")))]
#[case("", None)]
#[case("BOLT-INFO: done\n", None)]
#[case("Command terminated by signal 9\n", None)]
#[case("1.5 2048 extra\n", None)]
#[case("1.5 lots\n", None)]
fn sample_from_stderr(#[case] stderr: &str, #[case] expected: Option<(&str, &str)>) {
    let sample = TimingSample::from_stderr(stderr);
    let expected = expected.map(|(elapsed, peak_kb)| TimingSample {
        elapsed: elapsed.to_string(),
        peak_kb: peak_kb.to_string(),
    });
    assert_eq!(sample, expected);
}

#[test]
fn record_format() {
    let record = TimingRecord::from_runs(
        Some(Path::new("out/a.bolt")),
        "log\n1.20 3000\n",
        "0.90 2900\n",
    );
    assert_eq!(record.to_string(), "out/a.bolt; 1.20 3000; 0.90 2900");
}

#[test]
fn record_without_output_or_samples() {
    let record = TimingRecord::from_runs(None, "0.01 1000\n", "killed\n");
    assert_eq!(record.to_string(), "; 0.01 1000; - -");
}

#[test]
fn append_creates_and_never_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timing.log");
    let first = TimingRecord::from_runs(Some(Path::new("a")), "1 2\n", "3 4\n");
    let second = TimingRecord::from_runs(Some(Path::new("b")), "5 6\n", "7 8\n");

    append_record(&path, &first).unwrap();
    append_record(&path, &second).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "a; 1 2; 3 4\nb; 5 6; 7 8\n"
    );
}

#[test]
fn append_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let record = TimingRecord::from_runs(None, "", "");
    assert!(append_record(&dir.path().join("no/such/timing.log"), &record).is_err());
}
