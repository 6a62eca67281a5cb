mod manager;
mod state;

#[cfg(test)]
mod tests;

pub use manager::{Reconciliation, SessionManager};
pub use state::SessionState;
