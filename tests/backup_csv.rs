// tests/backup_csv.rs
use chrono::{TimeZone, Utc};
use std::fs;

use investor_finder::ingest::backup::{backup_records, BackupSink, CsvFileSink};
use investor_finder::CandidateRecord;

fn qualified() -> Vec<CandidateRecord> {
    let mut a = CandidateRecord::new("Pear VC", "Curated list");
    a.website = Some("https://pear.vc".into());
    a.score = 90;
    a.notes = Some("Matched: saas, b2b".into());
    let mut b = CandidateRecord::new("Acme, Ventures", "Search: saas seed");
    b.score = 70;
    b.snippet = Some("We said \"hi\"".into());
    vec![a, b]
}

#[test]
fn file_name_carries_timestamp() {
    let sink = CsvFileSink::new("/tmp/out");
    let at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
    assert_eq!(
        sink.path_for(at).to_str().unwrap(),
        "/tmp/out/investors_backup_20250307_140509.csv"
    );
}

#[tokio::test]
async fn writes_csv_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvFileSink::new(dir.path());

    let location = backup_records(&sink, &qualified()).await.unwrap();
    let content = fs::read_to_string(&location).unwrap();
    let lines: Vec<_> = content.lines().collect();

    assert_eq!(lines.len(), 3);
    let header: Vec<_> = lines[0].split(',').collect();
    assert_eq!(header[0], "name");
    assert!(header.contains(&"website"));
    assert!(header.contains(&"snippet"));
    assert!(header.contains(&"score"));
    assert!(lines[1].starts_with("Pear VC,https://pear.vc,"));
    assert!(lines[2].starts_with("\"Acme, Ventures\","));
    assert!(lines[2].contains("\"We said \"\"hi\"\"\""));
}

#[tokio::test]
async fn empty_set_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvFileSink::new(dir.path());
    assert_eq!(backup_records(&sink, &[]).await, None);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn unwritable_directory_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvFileSink::new(dir.path().join("missing").join("nested"));
    assert!(sink.store(&qualified()).await.is_err());
    assert_eq!(backup_records(&sink, &qualified()).await, None);
}
