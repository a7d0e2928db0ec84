use crate::DataResult;

/// Details screen state.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsState<D> {
    details: DataResult<D>,
    deleting: bool,
    dirty: bool,
}

impl<D> Default for DetailsState<D> {
    fn default() -> Self {
        Self {
            details: DataResult::Empty,
            deleting: false,
            dirty: false,
        }
    }
}

impl<D> DetailsState<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details(&self) -> &DataResult<D> {
        &self.details
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn show_content(&self) -> bool {
        self.details.is_success()
    }

    pub fn show_progress(&self) -> bool {
        self.details.is_pending() || self.deleting
    }

    pub fn enable_delete(&self) -> bool {
        !self.deleting
    }

    pub(crate) fn set_details(&mut self, details: DataResult<D>) {
        self.details = details;
        self.dirty = true;
    }

    pub(crate) fn set_deleting(&mut self, deleting: bool) {
        if self.deleting != deleting {
            self.deleting = deleting;
            self.dirty = true;
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
