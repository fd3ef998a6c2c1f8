//! Core data structures for EconOxide
//!
//! `eo-core` holds the tabular data the analysis pipelines consume: typed
//! columns, data frames, panel labels and design-matrix extraction.

pub mod data;
pub mod design;

pub use data::{DataError, DataFrame, DataFrameBuilder, IndexValue, PanelIndex, Series, SeriesValue};
pub use design::DesignMatrix;
