use std::collections::HashSet;

use eframe::egui::Pos2;

use crate::color::ColorMode;

pub type RecordId = usize;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub category: String,
    pub sentiment: f32,
    pub subjectivity: f32,
    pub raw_text: String,
    pub position: Option<Pos2>,
}

impl Record {
    pub fn new(
        id: RecordId,
        category: impl Into<String>,
        sentiment: f32,
        subjectivity: f32,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            sentiment,
            subjectivity,
            raw_text: raw_text.into(),
            position: None,
        }
    }

    pub fn score(&self, mode: ColorMode) -> f32 {
        match mode {
            ColorMode::Sentiment => self.sentiment,
            ColorMode::Subjectivity => self.subjectivity,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<Record>,
    /// Original record count when the input was cut down to the working-set cap.
    pub truncated_from: Option<usize>,
}

impl Dataset {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn categories(&self) -> Vec<String> {
        ordered_categories(self.records.iter().map(|record| record.category.as_str()))
    }
}

fn month_index(label: &str) -> Option<usize> {
    let lowered = label.trim().to_ascii_lowercase();
    if lowered.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|month| *month == lowered || (lowered.len() == 3 && month.starts_with(&lowered)))
}

/// Distinct labels in calendar order when every label names a month, otherwise in order of
/// first appearance.
pub fn ordered_categories<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();
    for label in labels {
        if seen.insert(label) {
            categories.push(label.to_owned());
        }
    }

    if !categories.is_empty()
        && categories
            .iter()
            .all(|category| month_index(category).is_some())
    {
        categories.sort_by_key(|category| month_index(category));
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::{Record, ordered_categories};
    use crate::color::ColorMode;

    #[test]
    fn month_labels_sort_by_calendar() {
        let ordered = ordered_categories(["May", "March", "April", "March"]);
        assert_eq!(ordered, vec!["March", "April", "May"]);
    }

    #[test]
    fn abbreviated_months_sort_by_calendar() {
        let ordered = ordered_categories(["Feb", "Jan", "Feb"]);
        assert_eq!(ordered, vec!["Jan", "Feb"]);
    }

    #[test]
    fn free_form_labels_keep_first_appearance() {
        let ordered = ordered_categories(["beta", "alpha", "May", "beta"]);
        assert_eq!(ordered, vec!["beta", "alpha", "May"]);
    }

    #[test]
    fn score_follows_color_mode() {
        let record = Record::new(3, "March", -0.4, 0.7, "text");
        assert_eq!(record.score(ColorMode::Sentiment), -0.4);
        assert_eq!(record.score(ColorMode::Subjectivity), 0.7);
        assert!(record.position.is_none());
    }
}
