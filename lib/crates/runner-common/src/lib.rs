pub mod coordinator;
pub mod types;

pub use coordinator::{RegistrationToken, Runner, RunnerLabel, RunnerList, RunnerStatus};
pub use types::*;
