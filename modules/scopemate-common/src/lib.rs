pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ScopeError;
pub use types::{Credentials, FitJudgment, Posting, RunStats};
