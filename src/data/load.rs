use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::parse::{IngestionError, parse_records};
use super::record::Dataset;

pub const DEFAULT_MAX_RECORDS: usize = 300;

pub fn load_dataset(path: &Path, max_records: usize) -> Result<Dataset, IngestionError> {
    let raw = fs::read_to_string(path).map_err(|source| IngestionError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    dataset_from_json_str(&raw, &path.display().to_string(), max_records)
}

pub(super) fn dataset_from_json_str(
    raw: &str,
    source: &str,
    max_records: usize,
) -> Result<Dataset, IngestionError> {
    let mut records = parse_records(raw)?;

    let truncated_from = if records.len() > max_records {
        let total = records.len();
        records.truncate(max_records);
        warn!(
            source,
            total, max_records, "dataset exceeds the layout working set, keeping the first records"
        );
        Some(total)
    } else {
        None
    };

    let out_of_domain = records
        .iter()
        .filter(|record| {
            !(-1.0..=1.0).contains(&record.sentiment) || !(0.0..=1.0).contains(&record.subjectivity)
        })
        .count();
    if out_of_domain > 0 {
        warn!(
            source,
            out_of_domain, "records carry scores outside their domain; colors will be clamped"
        );
    }

    let dataset = Dataset {
        source: source.to_owned(),
        records,
        truncated_from,
    };
    info!(source, records = dataset.record_count(), "dataset loaded");

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::dataset_from_json_str;

    fn sample(count: usize) -> String {
        let entries = (0..count)
            .map(|index| {
                format!(
                    r#"{{"Month": "April", "Sentiment": 0.0, "Subjectivity": 0.5, "RawTweet": "post {index}"}}"#
                )
            })
            .collect::<Vec<_>>();
        format!("[{}]", entries.join(","))
    }

    #[test]
    fn keeps_small_datasets_whole() {
        let dataset = dataset_from_json_str(&sample(4), "memory", 300).expect("valid input");
        assert_eq!(dataset.record_count(), 4);
        assert_eq!(dataset.truncated_from, None);
        assert_eq!(dataset.categories(), vec!["April"]);
    }

    #[test]
    fn truncates_to_working_set_cap() {
        let dataset = dataset_from_json_str(&sample(12), "memory", 10).expect("valid input");
        assert_eq!(dataset.record_count(), 10);
        assert_eq!(dataset.truncated_from, Some(12));
        assert_eq!(dataset.records.last().map(|record| record.id), Some(9));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = super::load_dataset(
            std::path::Path::new("/definitely/not/here.json"),
            super::DEFAULT_MAX_RECORDS,
        );
        assert!(matches!(
            result,
            Err(super::IngestionError::Read { .. })
        ));
    }
}
