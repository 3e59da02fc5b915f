/// The record currently open in the detail view, if any.
///
/// The view is open exactly when a record is held.
#[derive(Debug, Clone)]
pub struct Selection<R> {
    current: Option<R>,
}

impl<R> Default for Selection<R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<R> Selection<R> {
    pub fn select(&mut self, record: R) {
        self.current = Some(record);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&R> {
        self.current.as_ref()
    }

    /// Swaps in a fresher copy of the selected record, keeping the view open.
    pub fn refresh_with(&mut self, record: R, same: impl Fn(&R, &R) -> bool) {
        if let Some(current) = self.current.as_mut() {
            if same(current, &record) {
                *current = record;
            }
        }
    }
}
