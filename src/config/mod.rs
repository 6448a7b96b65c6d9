//! Configuration module for clipboard conversion
//!
//! This module provides `ConversionOptions`, its feature flags, and the
//! tunable `Thresholds` used by the classification heuristics.

// Sub-modules
pub mod methods;
pub mod types;

// Re-exports for public API
pub use types::{
    ConversionOptions, DEFAULT_LARGE_DOCUMENT_THRESHOLD, NormalizationMode, Thresholds,
    TsvDetection,
};
