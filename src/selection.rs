use crate::data::RecordId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<RecordId>,
}

impl SelectionSet {
    /// Removes `id` if present, otherwise puts it in front. Returns whether `id` is now selected.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if let Some(index) = self.ids.iter().position(|selected| *selected == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.insert(0, id);
            true
        }
    }

    #[cfg(test)]
    pub fn toggled(mut self, id: RecordId) -> Self {
        self.toggle(id);
        self
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }
}
