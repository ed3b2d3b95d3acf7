//! Application services: use-case orchestration.
//!
//! Each service module implements one component of the unit-of-work engine by
//! composing domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application::ports`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod batch;
pub mod image_select;
pub mod instance;
pub mod pipeline;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::run_batch;
