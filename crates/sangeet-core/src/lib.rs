//! Core domain for sangeet.
//!
//! This crate defines the saved-composition model, the injectable key-value
//! storage medium, the composition store built on top of it, and the role
//! guard that decides whether a route renders or redirects.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod auth;
pub mod compositions;
pub mod error;
pub mod guard;
pub mod model;
pub mod storage;

pub use auth::{AuthContext, AuthStatus, AuthenticatedUser, Role};
pub use compositions::{CompositionStore, STORAGE_KEY};
pub use error::{Error, Result};
pub use guard::{decide, Decision, GuardKind, GuardState, Navigator, Notice, Notifier, Rendered, RouteGuard};
pub use model::{CompositionDraft, CompositionId, SavedComposition};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
