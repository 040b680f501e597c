//! Decomposer -- resolve the ambiguous placement of an indel shift in a Sanger trace.
#[macro_use]
extern crate log;
pub mod breakpoint;
pub mod config;
pub mod decompose;
pub mod error;
pub mod phasing;
pub mod profile;
pub mod stats;

pub use config::DecomposeConfig;
pub use error::DecomposeError;
