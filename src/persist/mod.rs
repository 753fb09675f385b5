//! Persistence and share codec.
//!
//! - [`codec`]: base64 markup text, storage snapshot JSON, share links
//! - [`storage`]: the [`KeyValueStore`] seam and its backends
//! - [`load`]: initial document resolution from URL and storage
//! - [`snapshot`]: debounced snapshot writes

pub mod codec;
pub mod load;
pub mod snapshot;
pub mod storage;

pub use codec::{ShareLink, decode_text, deserialize, encode_text, serialize, share_url};
pub use load::{InitialState, MarkupSource, QueryParams, resolve_initial};
pub use snapshot::SnapshotWriter;
pub use storage::{FileStore, KeyValueStore, MemoryStore, STORAGE_KEY};
