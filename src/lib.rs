//! depbump - dependency update automation for GitHub and GitLab repositories
//!
//! Extracts dependencies from repository manifests, looks up newer releases
//! from package registries, and automerges update branches once CI is green.

pub mod auth;
pub mod automerge;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod error;
pub mod git;
pub mod lookup;
pub mod manager;
pub mod platform;
pub mod types;
pub mod versioning;

pub use error::{Error, Result};
