//! depsheet_engine - cell names, dependency graph and formula evaluation.

pub mod engine;
