// src/errors/mod.rs
//! Diagnostics produced by the call-site adaptation layer.
//!
//! Only one condition here is a user-visible error: a coercion whose cast
//! target exists but cannot itself be resolved. Everything else the layer
//! checks is an internal invariant and panics instead.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ResolveError {
    #[error("error resolving a cast from {from} to {to}")]
    #[diagnostic(
        code(E3401),
        help("the troublesome function is declared at line {target_line}")
    )]
    CastResolution {
        from: String,
        to: String,
        /// Line of the call that required the coercion.
        line: u32,
        /// Line of the cast overload that failed to resolve.
        target_line: u32,
    },
}
