pub mod patch;

pub use patch::{patch, PatchSummary};
