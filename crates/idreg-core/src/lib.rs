//! # idreg-core — Foundational Types for the Identity Registry
//!
//! Leaf crate of the workspace. Defines the domain primitives every other
//! crate builds on, so that principals, credential material, and sequence
//! numbers can never be confused with one another or with bare strings.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Principal`,
//!    `IdentityHash`, `BlockHeight` — all newtypes with validated
//!    constructors. No bare strings for identifiers.
//!
//! 2. **Opaque credential material.** `IdentityHash` is held verbatim as
//!    the issuer supplied it. This crate never decodes or verifies it.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC, seconds precision, and
//!    is used only for journal metadata. Ordering of registry operations is
//!    expressed with `BlockHeight`, never with wall-clock time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `idreg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::ValidationError;
pub use identity::{IdentityHash, Principal, GENESIS_ADMIN, MAX_PRINCIPAL_LEN};
pub use temporal::{BlockHeight, Timestamp};
