use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::{Record, RecordId};

use super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Ids of records whose text or category fuzzily matches `query`.
pub(super) fn matching_record_ids(records: &[Record], query: &str) -> HashSet<RecordId> {
    let matcher = SkimMatcherV2::default();
    records
        .iter()
        .filter(|record| {
            fuzzy_match_score(&matcher, &record.raw_text, query).is_some()
                || fuzzy_match_score(&matcher, &record.category, query).is_some()
        })
        .map(|record| record.id)
        .collect()
}

impl ViewModel {
    /// Search matches for the current query, recomputed only when the query or record set changes.
    pub(super) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<RecordId>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let revision = self.session.revision();
        if let Some(cached) = &self.search_match_cache
            && cached.revision == revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(matching_record_ids(self.session.records(), query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::matching_record_ids;
    use crate::data::Record;

    fn records() -> Vec<Record> {
        vec![
            Record::new(0, "March", 0.4, 0.2, "Lockdown extended again"),
            Record::new(1, "April", -0.1, 0.7, "Grocery shelves are empty"),
            Record::new(2, "May", 0.0, 0.0, "Parks reopening this weekend"),
        ]
    }

    #[test]
    fn matches_text_case_insensitively() {
        let matches = matching_record_ids(&records(), "lockdown");
        assert!(matches.contains(&0));
        assert!(!matches.contains(&1));
    }

    #[test]
    fn matches_category_names() {
        let matches = matching_record_ids(&records(), "April");
        assert!(matches.contains(&1));
    }

    #[test]
    fn unmatched_query_is_empty() {
        assert!(matching_record_ids(&records(), "zzzzqx").is_empty());
    }
}
