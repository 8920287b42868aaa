//! # Event Journal
//!
//! Append-only log of successful registry transitions, in commit order.
//! Rejected calls never reach the journal.

use idreg_core::{BlockHeight, Principal, Timestamp};
use serde::{Deserialize, Serialize};

/// What a committed transition did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEventKind {
    /// A principal bound its identity.
    IdentityBound {
        /// The newly bound principal.
        principal: Principal,
        /// Issuer recorded on the binding.
        issued_by: Principal,
    },
    /// The admin revoked an identity.
    IdentityRevoked {
        /// Principal whose record was revoked.
        principal: Principal,
        /// Admin at the time of revocation.
        revoked_by: Principal,
    },
    /// A guardian moved an identity to a new principal.
    IdentityRecovered {
        /// Principal that lost the record.
        from: Principal,
        /// Principal that now holds it.
        to: Principal,
        /// Guardian that approved the move.
        guardian: Principal,
    },
    /// Admin rights changed hands.
    AdminTransferred {
        /// Outgoing admin.
        from: Principal,
        /// Incoming admin.
        to: Principal,
    },
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    /// Position in the journal, starting at 0, without gaps.
    pub sequence: u64,
    /// Ledger height the transition executed at.
    pub height: BlockHeight,
    /// Wall-clock time the entry was appended.
    pub recorded_at: Timestamp,
    /// The transition.
    #[serde(flatten)]
    pub kind: RegistryEventKind,
}

/// The append-only event log owned by a registry.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Vec<RegistryEvent>,
}

impl Journal {
    pub(crate) fn append(&mut self, height: BlockHeight, kind: RegistryEventKind) {
        let sequence = self.events.len() as u64;
        self.events.push(RegistryEvent {
            sequence,
            height,
            recorded_at: Timestamp::now(),
            kind,
        });
    }

    /// All entries in commit order.
    pub fn as_slice(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Entries with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[RegistryEvent] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.events.len());
        &self.events[start..]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
