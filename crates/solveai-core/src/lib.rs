//! Core types and trait definitions for SolveAI.
//!
//! No HTTP or database code lives here. Storage backends implement
//! [`store::ReportStore`], solver clients implement [`solver::Solver`].

pub mod analysis;
pub mod error;
pub mod input;
pub mod report;
pub mod research;
pub mod solver;
pub mod store;

pub use error::{Error, Result};
