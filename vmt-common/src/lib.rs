//! Hack VM Translator - Common Types and Utilities
//! 
//! This crate contains the error taxonomy and source location types shared
//! by the code generator, the backend and the driver.

pub mod error;
pub mod source_loc;

pub use error::{CommandError, TranslateError};
pub use source_loc::SourceLocation;
