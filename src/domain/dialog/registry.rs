//! Explicit registry of dialogs, handed to the stack manager at construction.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::DialogError;
use super::step::Dialog;

#[derive(Default, Clone)]
pub struct DialogRegistry {
    dialogs: HashMap<String, Arc<dyn Dialog>>,
}

impl DialogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dialog under its own id, returning any dialog it replaced.
    pub fn register(&mut self, dialog: Arc<dyn Dialog>) -> Option<Arc<dyn Dialog>> {
        self.dialogs.insert(dialog.id().to_string(), dialog)
    }

    pub fn with(mut self, dialog: Arc<dyn Dialog>) -> Self {
        self.register(dialog);
        self
    }

    pub fn get(&self, dialog_id: &str) -> Result<Arc<dyn Dialog>, DialogError> {
        self.dialogs
            .get(dialog_id)
            .cloned()
            .ok_or_else(|| DialogError::UnknownDialog(dialog_id.to_string()))
    }

    pub fn contains(&self, dialog_id: &str) -> bool {
        self.dialogs.contains_key(dialog_id)
    }

    pub fn is_skill(&self, dialog_id: &str) -> bool {
        self.dialogs
            .get(dialog_id)
            .is_some_and(|dialog| dialog.is_skill())
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.dialogs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for DialogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogRegistry")
            .field("dialogs", &self.ids())
            .finish()
    }
}
