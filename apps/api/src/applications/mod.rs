pub mod handlers;
pub mod listing;
#[cfg(test)]
pub mod memory;
pub mod stats;
pub mod store;
pub mod validation;
