//! Services module
//!
//! Business logic on top of the unit of work: the user directory, the bonus
//! ledger, and payload encoding for personal codes.

pub mod directory;
pub mod ledger;
pub mod qr;

pub use directory::{UserDirectory, UserPage};
pub use ledger::{BalanceChange, BalanceLedger, Debit};
pub use qr::{PayloadEncoder, QrCodeEncoder};
