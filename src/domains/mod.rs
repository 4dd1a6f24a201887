//! Domains module containing business logic organized by bounded contexts.
//!
//! - **catalog**: recognized CLE tools and their launch configuration

pub mod catalog;
