//! Identity transitions and how they reshape the store.
//!
//! Login and session restore merge account data with fixed precedence:
//! account wins for sort and page size and replaces the deck-id list, while
//! the local hand cart and print list are kept. Logout resets identity,
//! filters and deck ids but keeps both carts.

mod error;
pub mod merge;
mod notice;
mod reconciler;

pub use error::SessionError;
pub use merge::AccountData;
pub use notice::Notice;
pub use reconciler::{ReconcilerState, Reconciliation, SessionReconciler};
