//! Core types for the APK trend pipeline.
//!
//! Holds the value objects shared by every stage (size and count tables,
//! parsed reports, snapshots), the unit parsers, the box-drawing table
//! tokenizer and section extractor, error types and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod table;
pub mod units;
