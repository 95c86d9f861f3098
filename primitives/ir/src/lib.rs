// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! ldgen data model
//!
//! This crate defines the structures shared by every compiler stage: the
//! resolved [`Specification`] tree and the typed entities extracted from it
//! ([`Route`], [`Query`], [`DataSource`], [`PipeModuleReference`] and the
//! loaded [`PipeModule`]).

pub mod entities;
pub mod specification;

// Re-export the model for convenience
pub use entities::*;
pub use specification::*;
