//! opalc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation types shared by every phase of the
//! opalc front end:
//!
//! - **Diagnostics** - a [`Handler`] that collects [`Diagnostic`] values
//!   (lexical and syntactic errors with their source lines) so that a single
//!   run can report many problems before the caller decides what to do.
//! - **Typed indices** - the [`Idx`] trait, the [`IndexVec`] container and
//!   the [`define_idx!`] macro. Symbol-table entries and parse-tree nodes
//!   are addressed by typed indices instead of references, which keeps the
//!   arena-style storage append-only and copyable handles 4 bytes wide.
//!
//! Recoverable compile-time problems are diagnostics, never `Err` values;
//! `Result` is reserved for fatal conditions (I/O failure, a malformed
//! grammar file), which the owning crates model with their own error enums.

pub mod diagnostic;
pub mod index_vec;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
