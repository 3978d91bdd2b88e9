//! Seed list loading
//!
//! The seed list is a two-column CSV (`name,url`), one row per organization.
//! A header row is tolerated on the first line only, when its second field is a
//! bare word such as `url` rather than something address-shaped.

use crate::url::normalize_url;
use crate::SeedError;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use url::Url;

/// One organization and its crawl root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    pub name: String,
    pub url: Url,
}

/// Loads seeds from a CSV file
pub fn load_seeds(path: &Path) -> Result<Vec<SeedEntry>, SeedError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect_seeds(reader)
}

/// Reads seeds from any CSV source
pub fn read_seeds<R: Read>(source: R) -> Result<Vec<SeedEntry>, SeedError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    collect_seeds(reader)
}

fn collect_seeds<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<SeedEntry>, SeedError> {
    let mut seeds = Vec::new();
    let mut names = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;

        if record.iter().all(str::is_empty) {
            continue;
        }

        if record.len() != 2 {
            return Err(SeedError::FieldCount {
                row,
                found: record.len(),
            });
        }

        let name = &record[0];
        let raw_url = &record[1];

        if row == 1 && is_header_field(raw_url) {
            tracing::debug!("Skipping header row: {:?}", record);
            continue;
        }

        if name.is_empty() {
            return Err(SeedError::EmptyName { row });
        }

        let url = normalize_url(raw_url).map_err(|e| SeedError::InvalidUrl {
            row,
            url: raw_url.to_string(),
            reason: e.to_string(),
        })?;

        if !names.insert(name.to_string()) {
            return Err(SeedError::DuplicateName {
                row,
                name: name.to_string(),
            });
        }

        seeds.push(SeedEntry {
            name: name.to_string(),
            url,
        });
    }

    Ok(seeds)
}

/// A URL column that reads like a column title rather than a mistyped address
fn is_header_field(field: &str) -> bool {
    field.eq_ignore_ascii_case("url") || !(field.contains('.') || field.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_rows() {
        let csv = "Avon Trust,http://www.awp.nhs.uk/\nBarts Trust,https://www.bartshealth.nhs.uk\n";
        let seeds = read_seeds(csv.as_bytes()).unwrap();

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].name, "Avon Trust");
        assert_eq!(seeds[0].url.as_str(), "http://www.awp.nhs.uk/");
        assert_eq!(seeds[1].url.as_str(), "https://www.bartshealth.nhs.uk/");
    }

    #[test]
    fn test_skips_header_row() {
        let csv = "Trust,URL\nExampleTrust,http://example.org/\n";
        let seeds = read_seeds(csv.as_bytes()).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].name, "ExampleTrust");
    }

    #[test]
    fn test_schemeless_first_row_is_not_a_header() {
        let csv = "Avon Trust,www.awp.nhs.uk\nBarts,http://barts.example/\n";
        assert!(matches!(
            read_seeds(csv.as_bytes()),
            Err(SeedError::InvalidUrl { row: 1, .. })
        ));
    }

    #[test]
    fn test_header_field_detection() {
        assert!(is_header_field("url"));
        assert!(is_header_field("Website"));
        assert!(!is_header_field("www.awp.nhs.uk"));
        assert!(!is_header_field("http://example.org/"));

        let csv = "name,homepage\nExampleTrust,http://example.org/\n";
        assert_eq!(read_seeds(csv.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_quoted_names_with_commas() {
        let csv = "\"Trust, North\",http://north.example.org/\n";
        let seeds = read_seeds(csv.as_bytes()).unwrap();
        assert_eq!(seeds[0].name, "Trust, North");
    }

    #[test]
    fn test_blank_lines_ignored() {
        let csv = "A,http://a.example.org/\n\nB,http://b.example.org/\n";
        assert_eq!(read_seeds(csv.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_bad_url() {
        let csv = "A,http://a.example.org/\nB,ftp://b.example.org/\n";
        assert!(matches!(
            read_seeds(csv.as_bytes()),
            Err(SeedError::InvalidUrl { row: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let csv = "A,http://a.example.org/\nA,http://b.example.org/\n";
        assert!(matches!(
            read_seeds(csv.as_bytes()),
            Err(SeedError::DuplicateName { row: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        let csv = "A,http://a.example.org/,extra\n";
        assert!(matches!(
            read_seeds(csv.as_bytes()),
            Err(SeedError::FieldCount { row: 1, found: 3 })
        ));
    }

    #[test]
    fn test_rejects_empty_name() {
        let csv = "A,http://a.example.org/\n,http://b.example.org/\n";
        assert!(matches!(
            read_seeds(csv.as_bytes()),
            Err(SeedError::EmptyName { row: 2 })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ExampleTrust,http://example.org/").unwrap();
        file.flush().unwrap();

        let seeds = load_seeds(file.path()).unwrap();
        assert_eq!(seeds.len(), 1);
    }
}
