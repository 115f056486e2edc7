use eframe::egui::{Color32, Pos2};
use tracing::debug;

use crate::color::{ColorMode, color_for};
use crate::data::{Record, RecordId};
use crate::selection::SelectionSet;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointView {
    pub id: RecordId,
    pub position: Pos2,
    pub color: Color32,
    pub highlighted: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    records: Vec<Record>,
    selection: SelectionSet,
    color_mode: ColorMode,
    revision: u64,
}

impl Session {
    pub fn new(records: Vec<Record>) -> Self {
        let mut session = Self::default();
        session.ingest(records);
        session
    }

    pub fn ingest(&mut self, records: Vec<Record>) -> u64 {
        self.records = records;
        self.selection.clear();
        self.revision = self.revision.wrapping_add(1);
        self.revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records
            .get(id)
            .filter(|record| record.id == id)
            .or_else(|| self.records.iter().find(|record| record.id == id))
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn on_color_mode_change(&mut self, mode: ColorMode) -> bool {
        if self.color_mode == mode {
            return false;
        }
        debug!(mode = mode.label(), "color mode changed");
        self.color_mode = mode;
        true
    }

    /// Toggles `id`. Clicks on ids outside the current record set are ignored. Returns whether the
    /// record is selected afterwards.
    pub fn on_point_click(&mut self, id: RecordId) -> bool {
        if self.record(id).is_none() {
            debug!(id, "ignoring click on unknown record");
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Accepts solved records for `revision` only; results computed for a replaced record set are
    /// dropped. Returns whether the positions were applied.
    pub fn apply_layout(&mut self, revision: u64, solved: Vec<Record>) -> bool {
        if revision != self.revision || solved.len() != self.records.len() {
            debug!(
                revision,
                current = self.revision,
                "discarding layout for a superseded record set"
            );
            return false;
        }

        if self
            .records
            .iter()
            .zip(&solved)
            .any(|(current, incoming)| current.id != incoming.id)
        {
            debug!(revision, "discarding layout with mismatched record ids");
            return false;
        }

        for (record, incoming) in self.records.iter_mut().zip(solved) {
            record.position = incoming.position;
        }
        true
    }

    pub fn color_of(&self, record: &Record) -> Color32 {
        color_for(record.score(self.color_mode), self.color_mode)
    }

    pub fn point_views(&self) -> Vec<PointView> {
        self.records
            .iter()
            .map(|record| PointView {
                id: record.id,
                position: record.position.unwrap_or(Pos2::ZERO),
                color: self.color_of(record),
                highlighted: self.selection.contains(record.id),
            })
            .collect()
    }

    pub fn selected_records(&self) -> Vec<&Record> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.record(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::Session;
    use crate::color::{ColorMode, NEGATIVE_RED, NEUTRAL_GRAY, SUBJECTIVE_BLUE};
    use crate::data::Record;

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|id| Record::new(id, "March", -1.0, 1.0, format!("post {id}")))
            .collect()
    }

    #[test]
    fn starts_in_sentiment_mode_with_empty_selection() {
        let session = Session::new(records(3));
        assert_eq!(session.color_mode(), ColorMode::Sentiment);
        assert!(session.selection().is_empty());
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn clicks_toggle_selection_in_recency_order() {
        let mut session = Session::new(records(10));
        assert!(session.on_point_click(5));
        assert!(!session.on_point_click(5));
        assert!(session.selection().is_empty());

        session.on_point_click(5);
        session.on_point_click(7);
        assert_eq!(session.selection().ids(), &[7, 5]);
        assert_eq!(
            session
                .selected_records()
                .iter()
                .map(|record| record.id)
                .collect::<Vec<_>>(),
            vec![7, 5]
        );
    }

    #[test]
    fn clicks_on_unknown_ids_are_ignored() {
        let mut session = Session::new(records(2));
        assert!(!session.on_point_click(42));
        assert!(session.selection().is_empty());
    }

    #[test]
    fn ingest_clears_selection_and_bumps_revision() {
        let mut session = Session::new(records(4));
        session.on_point_click(1);
        session.on_point_click(2);

        let revision = session.ingest(records(2));
        assert_eq!(revision, 2);
        assert!(session.selection().is_empty());
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn ingest_keeps_the_chosen_color_mode() {
        let mut session = Session::new(records(3));
        session.on_color_mode_change(ColorMode::Subjectivity);
        session.on_point_click(2);

        session.ingest(records(5));
        assert_eq!(session.color_mode(), ColorMode::Subjectivity);
        assert!(session.selection().is_empty());
        assert_eq!(session.point_views()[0].color, SUBJECTIVE_BLUE);
    }

    #[test]
    fn stale_layouts_are_discarded() {
        let mut session = Session::new(records(2));
        let stale_revision = session.revision();
        let mut solved = records(2);
        for record in &mut solved {
            record.position = Some(pos2(1.0, 2.0));
        }

        session.ingest(records(2));
        assert!(!session.apply_layout(stale_revision, solved.clone()));
        assert!(session.records().iter().all(|record| record.position.is_none()));

        assert!(session.apply_layout(session.revision(), solved));
        assert!(
            session
                .records()
                .iter()
                .all(|record| record.position == Some(pos2(1.0, 2.0)))
        );
    }

    #[test]
    fn point_views_follow_mode_and_selection() {
        let mut session = Session::new(records(2));
        session.on_point_click(1);

        let views = session.point_views();
        assert_eq!(views[0].color, NEGATIVE_RED);
        assert!(!views[0].highlighted);
        assert!(views[1].highlighted);
        assert_eq!(views[0].position, pos2(0.0, 0.0));

        assert!(session.on_color_mode_change(ColorMode::Subjectivity));
        assert!(!session.on_color_mode_change(ColorMode::Subjectivity));
        let views = session.point_views();
        assert_eq!(views[0].color, SUBJECTIVE_BLUE);
        assert!(views[1].highlighted);
        assert_ne!(views[0].color, NEUTRAL_GRAY);
    }
}
