//! Transcript submission service: fingerprint-deduplicated ingestion into a
//! per-student course ledger, over SQLite.

pub mod alias;
pub mod config;
pub mod db;
pub mod fingerprint;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod services;
pub mod validate;
