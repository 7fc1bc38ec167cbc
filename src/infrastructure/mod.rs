//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without
//! containing allocation logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for wiring a simulation
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
