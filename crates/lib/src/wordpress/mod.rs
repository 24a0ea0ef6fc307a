//! # WordPress.org API
//!
//! Fetching and reshaping of the five plugin statistics endpoints.

pub mod client;
pub mod endpoints;
pub mod handlers;

pub use client::WordPressClient;
pub use handlers::{HandlerRegistry, StreamHandler};
