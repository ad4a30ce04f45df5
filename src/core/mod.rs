//! Core functionality module
//!
//! This module contains the triage pipeline proper: configuration and error
//! handling, the listing parser, the extension classifier, staging and
//! selective pulling, structured-record parsing, evidence aggregation, and
//! the session context tying them together.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `category` - File categories and the extension classifier
//! - `listing` - Recursive directory-listing parser
//! - `staging` - Local staging layout and atomic pass swap
//! - `puller` - Selective category puller
//! - `records` - Content-provider and usage-stats parsers
//! - `evidence` - Evidence snapshot aggregation and persistence
//! - `session` - Explicit per-connection session context

pub mod category;
pub mod config;
pub mod error;
pub mod evidence;
pub mod listing;
pub mod puller;
pub mod records;
pub mod session;
pub mod staging;
