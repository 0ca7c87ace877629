//! Data models for transform requests and their results.

mod request;
mod result;

pub use request::*;
pub use result::*;
