//! Personal Signal assistant: owner-only file commands and crypto price alerts

pub mod application;
pub mod domain;
pub mod infrastructure;
