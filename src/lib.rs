// VeriCheck: rule-based trust scoring for URLs, messages and job postings.
//
// This is the library root. The scoring engine is pure and has no
// dependency on the storage or web modules; those call into it.

pub mod config;
pub mod db;
pub mod history;
pub mod output;
pub mod scoring;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
