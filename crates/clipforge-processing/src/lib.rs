//! Clipforge Processing Library
//!
//! Compiles transform requests into external tool invocations, runs them and
//! packages the outcome.
//!
//! The flow for one request is: [`TransformPlan::from_request`] normalizes and
//! validates the options, [`CommandCompiler::compile`] turns the plan into a
//! [`CompiledCommand`], and a [`CommandExecutor`] runs it. [`TransformService`] ties
//! these to an artifact store and bounds how many tools run at once.

pub mod command;
pub mod compiler;
pub mod deid;
pub mod executor;
pub mod normalize;
pub mod plan;
pub mod service;
pub mod traits;
pub mod validator;

// Re-export commonly used types
pub use command::{CompiledCommand, ExternalTool};
pub use compiler::CommandCompiler;
pub use deid::{parse_deid_args, DeidArgsError, DeidOption};
pub use executor::{tail_chars, ProcessExecutor};
pub use normalize::{normalize_time, resolve_gif_preset, DitherMode, GifPreset, NormalizedTime};
pub use plan::{TransformPlan, TrimBounds};
pub use service::TransformService;
pub use traits::CommandExecutor;
pub use validator::{UploadValidator, ValidationError};
