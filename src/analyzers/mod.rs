pub mod classify;
pub mod duplicate;
pub mod layout;
pub mod reconcile;
