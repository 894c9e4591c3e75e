//! Per-collection fetch state
//!
//! Every server-backed collection in the data store carries its own items,
//! loading flag, and error slot. Fetches replace items wholesale; there is
//! no merging, and one collection's failure never touches another's state.

/// State of one cached collection.
///
/// `items` holds the last successfully fetched value (empty before the
/// first success). `fetched` is true only while the latest completed
/// fetch was a success. `error` holds the display string of the most
/// recent failure and is cleared by the next success.
#[derive(Debug, Clone)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub fetched: bool,
    pub error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CollectionState<T> {
    /// Creates an empty, idle state.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            fetched: false,
            error: None,
        }
    }

    /// Marks a fetch as started. Items and any prior error stay visible
    /// while the request is in flight.
    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// Applies a successful fetch: wholesale replacement, error cleared.
    pub fn apply_success(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
        self.fetched = true;
        self.error = None;
    }

    /// Applies a failed fetch: items untouched, error recorded.
    pub fn apply_failure(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.fetched = false;
        self.error = Some(message.into());
    }

    /// True while the entry holds a current successful fetch. A zero-item
    /// success counts; a failure or an in-flight fetch does not.
    pub fn is_loaded(&self) -> bool {
        !self.loading && self.fetched && self.error.is_none()
    }
}
