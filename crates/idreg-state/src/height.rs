//! # Height Sources
//!
//! The registry stamps each new record with the ledger height current at
//! bind time. Where that height comes from is the embedder's business; the
//! registry only asks a [`HeightSource`].

use idreg_core::BlockHeight;
use thiserror::Error;

/// Supplier of the monotonic sequence number recorded as `issued_at`.
pub trait HeightSource {
    /// The height at which the next operation executes.
    fn current(&self) -> BlockHeight;

    /// Called once after every successful mutating operation.
    fn on_commit(&mut self) {}
}

/// A height that never moves. Every record bound against it shares one
/// `issued_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeight(pub BlockHeight);

impl HeightSource for FixedHeight {
    fn current(&self) -> BlockHeight {
        self.0
    }
}

/// Height advanced by the ledger: one block per committed transaction,
/// plus explicit jumps forward via [`LedgerHeight::advance_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerHeight {
    height: BlockHeight,
}

/// Height of the first block after genesis.
pub const DEFAULT_START_HEIGHT: BlockHeight = BlockHeight(1);

impl LedgerHeight {
    /// Start counting at `height`.
    pub fn starting_at(height: BlockHeight) -> Self {
        Self { height }
    }

    /// Move the ledger forward to `height`. Moving to the current height is
    /// a no-op; moving backwards is rejected and leaves the height unchanged.
    pub fn advance_to(&mut self, height: BlockHeight) -> Result<(), HeightError> {
        if height < self.height {
            return Err(HeightError::Regression {
                current: self.height,
                requested: height,
            });
        }
        self.height = height;
        Ok(())
    }
}

impl Default for LedgerHeight {
    fn default() -> Self {
        Self::starting_at(DEFAULT_START_HEIGHT)
    }
}

impl HeightSource for LedgerHeight {
    fn current(&self) -> BlockHeight {
        self.height
    }

    fn on_commit(&mut self) {
        self.height = self.height.next();
    }
}

/// Errors from moving a [`LedgerHeight`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeightError {
    /// The requested height is below the current one.
    #[error("height regression: ledger is at {current}, requested {requested}")]
    Regression {
        /// Current ledger height.
        current: BlockHeight,
        /// Height that was requested.
        requested: BlockHeight,
    },
}
