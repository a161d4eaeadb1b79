pub mod draft_store;
pub mod executor;
pub mod media;
pub mod step_gate;
pub mod submission;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use draft_store::{DraftStorage, DraftStore, DraftStoreError, FileDraftStorage};
pub use executor::WizardExecutor;
pub use media::{DataUriPreviewConverter, PreviewConverter};
pub use submission::{HttpItemSubmitter, ItemSubmitter};
pub use wizard::{WizardError, WizardState, WizardStep};
