//! Language statistics across an owner's GitHub repositories.
//!
//! Repositories are listed with `gh`, shallow-cloned with `git`, their files
//! tallied by extension and folded into display languages. The result is
//! written as JSON and rendered into a pie chart by a remote service.

pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod formatters;
pub mod languages;
pub mod lister;
pub mod pipeline;
pub mod traversal;
pub mod types;
pub mod vcs;
