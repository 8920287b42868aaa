//! # idreg-state — Identity Registry State Machine
//!
//! The registry maps each principal to at most one [`IdentityRecord`] and
//! holds a single administrator. Five operations move it between states:
//!
//! ```text
//!                 bind (101)
//!   (unbound) ─────────────────▶ bound ──revoke (100, 102)──▶ bound + revoked
//!                                  │                               │
//!                                  └──── recover (102, 104, 103) ──┘
//!                                        moves the record to a new key,
//!                                        revocation status included
//!
//!   admin ──transfer_admin (105)──▶ admin'
//! ```
//!
//! There is no un-revoke and no un-bind. A record's binding fields are
//! fixed at creation; the only mutable field is the revocation flag.
//!
//! ## Modules
//!
//! - [`registry`]: the [`Registry`] and its operations.
//! - [`record`]: [`IdentityRecord`] with its immutable [`Binding`].
//! - [`error`]: [`RegistryError`] and the fixed numeric code table.
//! - [`height`]: [`HeightSource`] supplying `issued_at`.
//! - [`journal`]: append-only log of committed transitions.

pub mod error;
pub mod height;
pub mod journal;
pub mod record;
pub mod registry;

pub use error::{describe, ErrorCode, RegistryError, ERROR_CODES};
pub use height::{FixedHeight, HeightError, HeightSource, LedgerHeight, DEFAULT_START_HEIGHT};
pub use journal::{Journal, RegistryEvent, RegistryEventKind};
pub use record::{Binding, IdentityRecord};
pub use registry::Registry;
