//! # Identity Records
//!
//! A record is split along its mutability boundary:
//!
//! ```text
//! IdentityRecord
//! ├── Binding            (immutable after bind)
//! │   ├── identity_hash
//! │   ├── issued_by
//! │   ├── issued_at
//! │   └── recovery_guardians
//! └── is_revoked         (false ──revoke()──▶ true, never back)
//! ```
//!
//! `Binding` has private fields and no setters, and both types can only be
//! constructed inside this crate. Outside code can read records, never
//! build or edit one, so `issued_at` and the guardian set cannot drift and
//! revocation cannot be undone.

use std::collections::BTreeSet;

use idreg_core::{BlockHeight, IdentityHash, Principal};
use serde::Serialize;

/// The fields fixed at bind time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    identity_hash: IdentityHash,
    issued_by: Principal,
    issued_at: BlockHeight,
    recovery_guardians: BTreeSet<Principal>,
}

impl Binding {
    pub(crate) fn new(
        identity_hash: IdentityHash,
        issued_by: Principal,
        issued_at: BlockHeight,
        recovery_guardians: BTreeSet<Principal>,
    ) -> Self {
        Self {
            identity_hash,
            issued_by,
            issued_at,
            recovery_guardians,
        }
    }

    /// The bound credential material.
    pub fn identity_hash(&self) -> &IdentityHash {
        &self.identity_hash
    }

    /// The issuer who vouched for the binding.
    pub fn issued_by(&self) -> &Principal {
        &self.issued_by
    }

    /// Ledger height at bind time.
    pub fn issued_at(&self) -> BlockHeight {
        self.issued_at
    }

    /// Principals allowed to approve recovery of this record.
    pub fn recovery_guardians(&self) -> &BTreeSet<Principal> {
        &self.recovery_guardians
    }

    /// Whether `principal` may approve recovery of this record.
    pub fn is_guardian(&self, principal: &Principal) -> bool {
        self.recovery_guardians.contains(principal)
    }
}

/// An identity bound to one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    #[serde(flatten)]
    binding: Binding,
    is_revoked: bool,
}

impl IdentityRecord {
    pub(crate) fn new(binding: Binding) -> Self {
        Self {
            binding,
            is_revoked: false,
        }
    }

    /// The immutable part of the record.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Shorthand for `binding().identity_hash()`.
    pub fn identity_hash(&self) -> &IdentityHash {
        self.binding.identity_hash()
    }

    /// Shorthand for `binding().issued_by()`.
    pub fn issued_by(&self) -> &Principal {
        self.binding.issued_by()
    }

    /// Shorthand for `binding().issued_at()`.
    pub fn issued_at(&self) -> BlockHeight {
        self.binding.issued_at()
    }

    /// Shorthand for `binding().recovery_guardians()`.
    pub fn recovery_guardians(&self) -> &BTreeSet<Principal> {
        self.binding.recovery_guardians()
    }

    /// Whether the admin has revoked this identity.
    pub fn is_revoked(&self) -> bool {
        self.is_revoked
    }

    /// Mark the record revoked. Revoking twice leaves it revoked.
    pub(crate) fn revoke(&mut self) {
        self.is_revoked = true;
    }
}
