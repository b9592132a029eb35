//! Triage library exports for testing

pub mod cli;
pub mod core;

#[cfg(test)]
pub mod test_support;
