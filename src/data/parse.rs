use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::record::Record;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("failed to read dataset from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("expected a JSON array of records")]
    NotAnArray,
    #[error("record {index} is malformed: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Deserialize)]
struct RawRecord {
    #[serde(alias = "Month", alias = "month", alias = "Category")]
    category: String,
    #[serde(alias = "Sentiment")]
    sentiment: f32,
    #[serde(alias = "Subjectivity")]
    subjectivity: f32,
    #[serde(alias = "RawTweet", alias = "raw_tweet", alias = "text")]
    raw_text: String,
}

pub fn parse_records(raw: &str) -> Result<Vec<Record>, IngestionError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let entries = parsed.as_array().ok_or(IngestionError::NotAnArray)?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, value) in entries.iter().enumerate() {
        let entry = RawRecord::deserialize(value)
            .map_err(|source| IngestionError::InvalidRecord { index, source })?;
        records.push(Record::new(
            index,
            entry.category.trim(),
            entry.sentiment,
            entry.subjectivity,
            entry.raw_text,
        ));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{IngestionError, parse_records};

    #[test]
    fn parses_tweet_shaped_objects() {
        let raw = r#"[
            {"Month": "March", "Sentiment": -0.5, "Subjectivity": 0.25, "RawTweet": "meh", "idx": 9},
            {"category": "April", "sentiment": 1, "subjectivity": 0, "raw_text": "great"}
        ]"#;

        let records = parse_records(raw).expect("valid input");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 0);
        assert_eq!(records[0].category, "March");
        assert_eq!(records[0].sentiment, -0.5);
        assert_eq!(records[0].raw_text, "meh");
        assert_eq!(records[1].id, 1);
        assert_eq!(records[1].sentiment, 1.0);
        assert!(records.iter().all(|record| record.position.is_none()));
    }

    #[test]
    fn empty_array_is_an_empty_dataset() {
        assert!(parse_records("[]").expect("valid input").is_empty());
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_records("not json"),
            Err(IngestionError::Parse(_))
        ));
    }

    #[test]
    fn rejects_top_level_object() {
        assert!(matches!(
            parse_records(r#"{"Month": "May"}"#),
            Err(IngestionError::NotAnArray)
        ));
    }

    #[test]
    fn reports_index_of_record_with_missing_field() {
        let raw = r#"[
            {"Month": "May", "Sentiment": 0.1, "Subjectivity": 0.2, "RawTweet": "ok"},
            {"Month": "May", "Sentiment": 0.1, "RawTweet": "no subjectivity"}
        ]"#;

        match parse_records(raw) {
            Err(IngestionError::InvalidRecord { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
