//! Per-key mutation history.
//!
//! Every key ever written owns an append-only list of events ordered by
//! version. Histories are never deleted, so a fully removed key still
//! answers questions about its past.

mod key_history;
mod store;

pub use key_history::KeyHistory;
pub use store::HistoryStore;
