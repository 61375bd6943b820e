pub mod history;
pub mod preferences;
pub mod registry;
pub mod scoring;
pub mod sync;

pub use preferences::{PreferenceStore, DEFAULT_HISTORY_LIMIT};
pub use registry::ProfileRegistry;
pub use scoring::Vote;
pub use sync::{HttpPreferenceSync, PreferenceEvent, PreferenceSync};
