//! # Registry Error Taxonomy
//!
//! Every failure of a registry operation is one of six variants, each tied
//! to a fixed numeric code that external consumers match on. The codes are
//! part of the wire contract and must never be renumbered or merged.
//!
//! | Code | Variant | Raised by |
//! |------|---------|-----------|
//! | 100 | [`RegistryError::NotAuthorized`] | `revoke_identity` |
//! | 101 | [`RegistryError::AlreadyBound`] | `bind` |
//! | 102 | [`RegistryError::NotBound`] | reads, `revoke_identity`, `recover_identity` |
//! | 103 | [`RegistryError::NotGuardian`] | `recover_identity` |
//! | 104 | [`RegistryError::RecoveryTargetBound`] | `recover_identity` |
//! | 105 | [`RegistryError::AdminTransferDenied`] | `transfer_admin` |
//!
//! 101 and 104 describe the same condition class ("already bound") but are
//! reported from different call sites and stay distinct.

use idreg_core::Principal;
use thiserror::Error;

/// A rejected registry operation. Failed operations never mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller is not the current administrator (code 100).
    #[error("caller {caller} is not the registry admin")]
    NotAuthorized {
        /// Principal that attempted the admin action.
        caller: Principal,
    },

    /// The caller already has an identity bound (code 101).
    #[error("principal {principal} already has a bound identity")]
    AlreadyBound {
        /// Principal whose binding already exists.
        principal: Principal,
    },

    /// No identity is bound to the principal (code 102).
    #[error("no identity is bound to {principal}")]
    NotBound {
        /// Principal that has no record.
        principal: Principal,
    },

    /// The caller is not in the record's guardian set (code 103).
    #[error("caller {caller} is not a recovery guardian of {principal}")]
    NotGuardian {
        /// Principal that attempted the recovery.
        caller: Principal,
        /// Principal whose record was to be recovered.
        principal: Principal,
    },

    /// The recovery target already has an identity bound (code 104).
    #[error("recovery target {principal} already has a bound identity")]
    RecoveryTargetBound {
        /// The occupied target principal.
        principal: Principal,
    },

    /// The caller may not hand over admin rights (code 105).
    #[error("caller {caller} may not transfer admin rights")]
    AdminTransferDenied {
        /// Principal that attempted the transfer.
        caller: Principal,
    },
}

impl RegistryError {
    /// The fixed numeric code for this error.
    pub fn code(&self) -> u16 {
        self.info().code
    }

    /// The symbolic name for this error, e.g. `ERR-NOT-BOUND`.
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// The static table entry describing this error.
    pub fn info(&self) -> &'static ErrorCode {
        let index = match self {
            Self::NotAuthorized { .. } => 0,
            Self::AlreadyBound { .. } => 1,
            Self::NotBound { .. } => 2,
            Self::NotGuardian { .. } => 3,
            Self::RecoveryTargetBound { .. } => 4,
            Self::AdminTransferDenied { .. } => 5,
        };
        &ERROR_CODES[index]
    }
}

/// One row of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    /// Numeric code reported to callers.
    pub code: u16,
    /// Symbolic name.
    pub name: &'static str,
    /// What the code means.
    pub description: &'static str,
}

/// The complete error taxonomy, ordered by code.
pub const ERROR_CODES: [ErrorCode; 6] = [
    ErrorCode {
        code: 100,
        name: "ERR-NOT-AUTHORIZED",
        description: "caller is not the registry admin",
    },
    ErrorCode {
        code: 101,
        name: "ERR-ALREADY-BOUND",
        description: "caller already has a bound identity",
    },
    ErrorCode {
        code: 102,
        name: "ERR-NOT-BOUND",
        description: "no identity is bound to the principal",
    },
    ErrorCode {
        code: 103,
        name: "ERR-NOT-GUARDIAN",
        description: "caller is not a recovery guardian of the identity",
    },
    ErrorCode {
        code: 104,
        name: "ERR-RECOVERY-TARGET-BOUND",
        description: "recovery target already has a bound identity",
    },
    ErrorCode {
        code: 105,
        name: "ERR-ADMIN-TRANSFER-DENIED",
        description: "caller may not transfer admin rights",
    },
];

/// Look up a taxonomy entry by numeric code.
pub fn describe(code: u16) -> Option<&'static ErrorCode> {
    ERROR_CODES.iter().find(|e| e.code == code)
}
