//! semgraph library: semantic fact graphs from typed syntax trees.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
