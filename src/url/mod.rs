//! URL handling module for Trust-Crawler
//!
//! This module provides the single canonical normalization applied both to
//! visited-set keys and to the domain-scope check: [`domain_key`] for hosts and
//! [`normalize_path`] for paths.

mod domain;
mod normalize;

pub use domain::domain_key;
pub use normalize::{canonicalize, normalize_path, normalize_url};
