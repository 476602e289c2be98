use std::sync::{Arc, PoisonError, RwLock};

/// Holds the text of the most recently ingested document.
///
/// There is a single slot: `replace` swaps the whole text and the last
/// completed call wins. Readers get an immutable snapshot, so a concurrent
/// replace can never hand them a mix of old and new content.
#[derive(Debug)]
pub struct DocumentStore {
    text: RwLock<Arc<str>>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            text: RwLock::new(Arc::from("")),
        }
    }
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, text: impl Into<Arc<str>>) {
        let text = text.into();
        // The guard only protects a pointer swap, so a poisoned lock still
        // holds a complete value.
        *self.text.write().unwrap_or_else(PoisonError::into_inner) = text;
    }

    #[must_use]
    pub fn current(&self) -> Arc<str> {
        Arc::clone(&self.text.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Length of the stored text in characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.current().chars().count()
    }
}
