//! On-disk records for the advising engine: catalog, transcript, and degree
//! documents, plus the data-directory configuration and JSON loaders.

pub mod config;
pub mod loader;
pub mod models;
