//! Deterministic page-sampling simulator for citation distributions.
//!
//! `citesim` ranks the nearest neighbours of a query under a weighted mix of
//! similarity, recency, citation count and government score, cuts the ranking
//! into pages and simulates a reader drawing papers with exponentially
//! decaying interest in deeper pages. A batch orchestrator runs every query
//! against hundreds of configurations, appends per-query results to durable
//! logs and resumes from them after a restart. Given the same inputs and base
//! seed, every selection is reproduced bit-for-bit.

pub mod citations;
pub mod config;
pub mod experiment;
pub mod features;
pub mod retrieval;
pub mod selection;
pub mod store;
pub mod types;
