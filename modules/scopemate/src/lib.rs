pub mod artifacts;
pub mod browser;
pub mod navigator;
pub mod postings;
pub mod session;
pub mod traits;
pub mod triage;
pub mod wait;
