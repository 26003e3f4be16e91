//! Side effects driven by the deck editor: autosave and debounced validation.

mod autosave;
mod validation;

pub use autosave::{AutoSaveError, DeckAutoSave, UnloadOutcome, UnmountOutcome, UNLOAD_WARNING};
pub use validation::{DeckValidationClient, ValidationState};
