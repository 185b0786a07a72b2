use camino::Utf8PathBuf;

use absearch::app::evaluate;
use absearch::domain::Criteria;
use absearch::output::{CsvOutput, TableOutput};
use absearch::providers::{AntibodyProvider, MockProvider};

#[test]
fn csv_written_atomically_to_destination() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();
    let path = dir.join("results.csv");

    let records = MockProvider.search("TP53").unwrap();
    let report = evaluate("TP53", &records, &Criteria::default());
    CsvOutput::write(&path, &report.entries).unwrap();

    let content = std::fs::read_to_string(path.as_std_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("MockVendor,MV-TP53-004,"));

    let leftovers = std::fs::read_dir(dir.as_std_path()).unwrap().count();
    assert_eq!(leftovers, 1);

    CsvOutput::write(&path, &[]).unwrap();
    let content = std::fs::read_to_string(path.as_std_path()).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn table_lists_ranked_entries() {
    let records = MockProvider.search("TP53").unwrap();
    let report = evaluate("TP53", &records, &Criteria::default());
    let table = TableOutput::render(&report.entries);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("MockVendor  MV-TP53-004"));
    assert!(lines[2].contains("420.00 USD"));
    assert!(lines[3].contains("ICFC,ICC,IHC"));
}
