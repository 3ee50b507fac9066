//! JSON file shelf.
//!
//! Handles upload validation, the simulated upload, the single-writer
//! file store with its reducer and selectors, and snapshot persistence.

pub mod actions;
pub mod confirm;
pub mod form;
pub mod page;
pub mod persist;
pub mod reducer;
pub mod schema;
pub mod selectors;
pub mod sqlite;
pub mod storage;
pub mod store;
pub mod table;
pub mod upload;
pub mod validation;

pub use actions::Action;
pub use confirm::{request_delete, AutoConfirm, Confirmation, Dismissed, Prompt, TerminalConfirm};
pub use form::{FormErrors, UploadFlow, UploadForm};
pub use persist::{PersistenceSync, DEFAULT_STORAGE_KEY};
pub use schema::{FileRow, FilesState, Snapshot, StoredFile, UploadProgress};
pub use sqlite::SqliteStorage;
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use store::{DuplicateFile, Store, StoreHook};
pub use table::{DeleteIntent, FileTable};
pub use upload::{FileSource, InMemoryFile, LocalFile, UploadError, UploadSimulator, UploadStream};
pub use validation::{is_valid_json_file, ValidationRules};
