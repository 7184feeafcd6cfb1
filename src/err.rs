//! Error interface for this crate.
//!
//! This module re-exports every error type in the crate, and declares [`Error`],
//! which adds user-facing hints on top of [`std::error::Error`].

use std::borrow::Cow;

pub use crate::parse::lex::LexErr;
pub use crate::asm::{AsmErr, AsmErrKind};
pub use crate::sim::SimErr;

/// Unified error interface for all errors in this crate.
pub trait Error: std::error::Error {
    /// The 0-based source line this error is associated with, if any.
    fn line(&self) -> Option<usize> {
        None
    }

    /// A clarifying message to help with this error.
    fn help(&self) -> Option<Cow<str>>;
}
