//! Session Layer
//!
//! Async plumbing around the synchronous game core. Nothing here affects
//! board generation or turn outcomes.
//!
//! - `actor`: Tokio task owning a `GameManager`
//! - `clock`: Epoch-millisecond clock over tokio time
//! - `assets`: Texture preloading
//! - `store`: Snapshot persistence backends
//! - `timer`: Elapsed-time counter and formatting

pub mod actor;
pub mod clock;
pub mod assets;
pub mod store;
pub mod timer;

pub use actor::{GameSession, SessionError, SessionOptions, SessionStart, SessionStatus};
pub use clock::SessionClock;
pub use assets::{AssetError, AssetLoader, NoopAssetLoader};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, StoreError, StoreResult};
pub use timer::{ElapsedTimer, format_elapsed, TIMER_TICK};
