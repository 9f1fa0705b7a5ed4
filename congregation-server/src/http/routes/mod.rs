//! Route handlers organized by resource

pub mod root;
pub mod stats;
pub mod gallery;
pub mod contact;
pub mod diagnostics;
