//! Branch-level configuration models

pub mod branch;

pub use branch::BranchTokenConfig;
