//! Domain layer: pure types and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod batch;
pub mod bootscript;
pub mod config;
pub mod error;
pub mod image;
pub mod unit;

pub use batch::{BatchReport, Operation, UnitFailure};
pub use config::{BatchInput, LaunchOverrides, TerminateInput, resolve_launch, resolve_terminate};
pub use error::{ConfigError, NoMatchError, ProviderError, RegistryError, TimeoutError};
pub use image::{Image, NamePattern};
pub use unit::{
    Batch, ImageCriteria, LaunchConfig, TerminateConfig, Unit, UnitId, UnitPlan, generate_label,
};
