//! Concrete collaborator implementations

pub mod http_probe;

#[cfg(test)]
pub mod tests;

pub use http_probe::*;
