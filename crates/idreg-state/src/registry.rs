//! # Identity Registry
//!
//! The single authoritative mapping from principal to [`IdentityRecord`],
//! plus the current administrator.
//!
//! ## Operations
//!
//! | Operation | Gate | Errors (in check order) |
//! |-----------|------|-------------------------|
//! | [`Registry::bind`] | none, binds the caller | 101 |
//! | [`Registry::is_identity_bound`] | none | — |
//! | [`Registry::get_identity_hash`] | none | 102 |
//! | [`Registry::revoke_identity`] | admin | 100, 102 |
//! | [`Registry::recover_identity`] | guardian of `lost` | 102, 104, 103 |
//! | [`Registry::transfer_admin`] | admin | 105 |
//!
//! ## Atomicity
//!
//! Every mutating method takes `&mut self` and performs all of its checks
//! before its first write, so a rejected call leaves records, admin, height
//! and journal exactly as they were. Callers sharing a registry across
//! threads must wrap the whole value in one lock; see `idreg-api`.

use std::collections::HashMap;

use idreg_core::{BlockHeight, IdentityHash, Principal};

use crate::error::RegistryError;
use crate::height::{HeightSource, LedgerHeight};
use crate::journal::{Journal, RegistryEvent, RegistryEventKind};
use crate::record::{Binding, IdentityRecord};

/// The identity registry.
///
/// Generic over where `issued_at` heights come from; defaults to a
/// [`LedgerHeight`] that advances one block per committed transaction.
#[derive(Debug, Clone)]
pub struct Registry<H = LedgerHeight> {
    admin: Principal,
    records: HashMap<Principal, IdentityRecord>,
    heights: H,
    journal: Journal,
}

impl Registry<LedgerHeight> {
    /// Create an empty registry administered by `genesis_admin`.
    pub fn new(genesis_admin: Principal) -> Self {
        Self::with_heights(genesis_admin, LedgerHeight::default())
    }
}

impl Default for Registry<LedgerHeight> {
    fn default() -> Self {
        Self::new(Principal::genesis_admin())
    }
}

impl<H: HeightSource> Registry<H> {
    /// Create an empty registry reading heights from `heights`.
    pub fn with_heights(genesis_admin: Principal, heights: H) -> Self {
        Self {
            admin: genesis_admin,
            records: HashMap::new(),
            heights,
            journal: Journal::default(),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Bind `caller`'s identity.
    ///
    /// The new record is stamped with the current height and starts
    /// unrevoked. Duplicate guardians collapse into one.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyBound`] (101) if `caller` already has a record.
    pub fn bind(
        &mut self,
        caller: &Principal,
        identity_hash: IdentityHash,
        issued_by: Principal,
        recovery_guardians: impl IntoIterator<Item = Principal>,
    ) -> Result<(), RegistryError> {
        if self.records.contains_key(caller) {
            return Err(RegistryError::AlreadyBound {
                principal: caller.clone(),
            });
        }

        let height = self.heights.current();
        let binding = Binding::new(
            identity_hash,
            issued_by.clone(),
            height,
            recovery_guardians.into_iter().collect(),
        );
        self.records
            .insert(caller.clone(), IdentityRecord::new(binding));
        self.commit(
            height,
            RegistryEventKind::IdentityBound {
                principal: caller.clone(),
                issued_by,
            },
        );
        Ok(())
    }

    /// Revoke `user`'s identity. Revoking an already revoked identity
    /// succeeds and changes nothing on the record.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotAuthorized`] (100) if `caller` is not the admin.
    ///   Checked first, so it is reported whether or not `user` is bound.
    /// - [`RegistryError::NotBound`] (102) if `user` has no record.
    pub fn revoke_identity(
        &mut self,
        caller: &Principal,
        user: &Principal,
    ) -> Result<(), RegistryError> {
        if !self.is_admin(caller) {
            return Err(RegistryError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        let record = self
            .records
            .get_mut(user)
            .ok_or_else(|| RegistryError::NotBound {
                principal: user.clone(),
            })?;
        record.revoke();

        let height = self.heights.current();
        self.commit(
            height,
            RegistryEventKind::IdentityRevoked {
                principal: user.clone(),
                revoked_by: caller.clone(),
            },
        );
        Ok(())
    }

    /// Move `lost`'s record to `new_principal`, approved by guardian `caller`.
    ///
    /// The record moves whole: hash, issuer, `issued_at`, guardians and
    /// revocation status are carried over unchanged, and `lost` is unbound.
    ///
    /// # Errors
    ///
    /// In check order:
    /// 1. [`RegistryError::NotBound`] (102) if `lost` has no record.
    /// 2. [`RegistryError::RecoveryTargetBound`] (104) if `new_principal`
    ///    already has a record (including `new_principal == lost`).
    /// 3. [`RegistryError::NotGuardian`] (103) if `caller` is not one of
    ///    `lost`'s recovery guardians.
    pub fn recover_identity(
        &mut self,
        caller: &Principal,
        lost: &Principal,
        new_principal: &Principal,
    ) -> Result<(), RegistryError> {
        let record = self
            .records
            .get(lost)
            .ok_or_else(|| RegistryError::NotBound {
                principal: lost.clone(),
            })?;
        if self.records.contains_key(new_principal) {
            return Err(RegistryError::RecoveryTargetBound {
                principal: new_principal.clone(),
            });
        }
        if !record.binding().is_guardian(caller) {
            return Err(RegistryError::NotGuardian {
                caller: caller.clone(),
                principal: lost.clone(),
            });
        }

        let Some(record) = self.records.remove(lost) else {
            return Err(RegistryError::NotBound {
                principal: lost.clone(),
            });
        };
        self.records.insert(new_principal.clone(), record);

        let height = self.heights.current();
        self.commit(
            height,
            RegistryEventKind::IdentityRecovered {
                from: lost.clone(),
                to: new_principal.clone(),
                guardian: caller.clone(),
            },
        );
        Ok(())
    }

    /// Hand admin rights to `new_admin`. Any principal is accepted,
    /// including the current admin.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AdminTransferDenied`] (105) if `caller` is not the admin.
    pub fn transfer_admin(
        &mut self,
        caller: &Principal,
        new_admin: Principal,
    ) -> Result<(), RegistryError> {
        if !self.is_admin(caller) {
            return Err(RegistryError::AdminTransferDenied {
                caller: caller.clone(),
            });
        }
        let previous = std::mem::replace(&mut self.admin, new_admin.clone());

        let height = self.heights.current();
        self.commit(
            height,
            RegistryEventKind::AdminTransferred {
                from: previous,
                to: new_admin,
            },
        );
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Whether `user` has a record.
    pub fn is_identity_bound(&self, user: &Principal) -> bool {
        self.records.contains_key(user)
    }

    /// The credential material bound to `user`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotBound`] (102) if `user` has no record.
    pub fn get_identity_hash(&self, user: &Principal) -> Result<&IdentityHash, RegistryError> {
        self.identity_record(user).map(IdentityRecord::identity_hash)
    }

    /// The full record bound to `user`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotBound`] (102) if `user` has no record.
    pub fn identity_record(&self, user: &Principal) -> Result<&IdentityRecord, RegistryError> {
        self.records
            .get(user)
            .ok_or_else(|| RegistryError::NotBound {
                principal: user.clone(),
            })
    }

    /// Whether `user`'s identity has been revoked.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotBound`] (102) if `user` has no record.
    pub fn is_identity_revoked(&self, user: &Principal) -> Result<bool, RegistryError> {
        self.identity_record(user).map(IdentityRecord::is_revoked)
    }

    /// The current administrator.
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    /// Whether `principal` is the current administrator.
    pub fn is_admin(&self, principal: &Principal) -> bool {
        &self.admin == principal
    }

    /// Height the next operation will execute at.
    pub fn height(&self) -> BlockHeight {
        self.heights.current()
    }

    /// Mutable access to the height source, for embedders that drive it.
    pub fn heights_mut(&mut self) -> &mut H {
        &mut self.heights
    }

    /// Every committed transition, oldest first.
    pub fn events(&self) -> &[RegistryEvent] {
        self.journal.as_slice()
    }

    /// Committed transitions with `sequence >= from`.
    pub fn events_since(&self, from: u64) -> &[RegistryEvent] {
        self.journal.since(from)
    }

    /// Iterate over all bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Principal, &IdentityRecord)> {
        self.records.iter()
    }

    /// Number of bound identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no identity is bound.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn commit(&mut self, height: BlockHeight, kind: RegistryEventKind) {
        self.journal.append(height, kind);
        self.heights.on_commit();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
