//! Layout Engine - Placement negotiation for grouped math content
//!
//! This crate implements the recursive protocol through which presentation
//! nodes acquire layout space from their ancestors. Grouping wrappers let their
//! single child negotiate multi-line placement through a proxy, then enclose the
//! measured result in sized delimiters and report it upward as one area.

mod area;
mod arena;
mod config;
mod diagnostics;
mod error;
mod fragment;
mod grouping;
mod negotiator;
mod root;

pub use area::*;
pub use arena::*;
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use fragment::*;
pub use grouping::*;
pub use negotiator::*;
pub use root::*;

pub use render_model::{AreaId, NodeId};
