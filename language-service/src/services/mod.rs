pub mod document;
pub mod language;
pub mod metrics;
pub mod storage;

pub use document::{build_document, Document};
pub use language::{Capability, LanguageProvider, ProviderError};
pub use metrics::{get_metrics, init_metrics};
pub use storage::{GcsStorage, LocalStorage, Storage, StorageError};
