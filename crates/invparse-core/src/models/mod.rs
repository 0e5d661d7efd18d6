//! Data models shared by the extractors and their callers.

pub mod config;
pub mod invoice;
