//! Herd Select - declarative selection of herd individuals
//!
//! Filter groups, sort chains and take/skip windows over ruminants, labour
//! and animal cohorts, configured from TOML and evaluated with a seeded
//! generator.

pub mod core;
pub mod entity;
pub mod grouping;
