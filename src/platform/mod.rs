//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (mouse/touch coalescing)
//! - Storage (LocalStorage on web, memory elsewhere)

pub mod input;
pub mod storage;

pub use input::{InputCoalescer, PressSource, RawPress};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{KeyValueStore, MemoryStore};
