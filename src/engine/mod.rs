//! Core engine modules for taskrank.

pub mod cluster;
pub mod config;
pub mod context;
pub mod energy;
pub mod error;
pub mod graph;
pub mod math;
pub mod optimizer;
pub mod pareto;
pub mod recency;
pub mod repo;
pub mod resolver;
pub mod scoring;
pub mod similarity;
pub mod types;
pub mod weights;
