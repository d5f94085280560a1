//! DQI: Data Quality Impact Calculator
//!
//! Models how data-quality defects distort the observed outcome of an A/B
//! experiment relative to its true outcome. The core is a pure Impact
//! Model; a thin CLI renders its output record.

pub mod cli;
pub mod model;
