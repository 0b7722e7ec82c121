//! Setlist session runtime
//!
//! [`PlaylistSession`] holds the live playlist, gates saving on a completed
//! load and pushes every change to storage in the background.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use setlist_config::SaveMode;
//! use setlist_core::SongDraft;
//! use setlist_session::{LoadOutcome, PlaylistSession};
//! use setlist_storage::{MemoryStore, PlaylistPersistence};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> setlist_core::Result<()> {
//! let persistence = PlaylistPersistence::new(Arc::new(MemoryStore::new()));
//! let mut session = PlaylistSession::new(persistence, SaveMode::Serialized)?;
//!
//! assert_eq!(session.load().await, LoadOutcome::NotFound);
//! session.add_song(SongDraft::new("Jolene", "Dolly Parton"))?;
//! session.flush().await;
//!
//! assert_eq!(session.persistence().load(), *session.state());
//! # Ok(())
//! # }
//! ```

mod session;
mod writer;

pub use session::{LoadOutcome, PlaylistSession};
