//! # wpstats: WordPress.org Plugin Statistics Tap
//!
//! This crate polls the public WordPress.org plugin statistics API for a list of
//! plugins and turns the heterogeneous JSON responses into flat, typed records
//! that are emitted as Singer `SCHEMA` and `RECORD` messages.
//!
//! The pieces fit together as follows:
//!
//! 1.  [`StreamRegistry`] describes the five output streams and their field mappings.
//! 2.  [`HandlerRegistry`] resolves each stream to the handler that reshapes its responses.
//! 3.  [`WordPressClient`] fetches the endpoints and yields cleaned records lazily.
//! 4.  [`sync`] walks the selected streams of a [`Catalog`] and writes the messages.

pub mod catalog;
pub mod clean;
pub mod config;
pub mod errors;
pub mod singer;
pub mod streams;
pub mod sync;
pub mod types;
pub mod wordpress;

pub use catalog::{Catalog, CatalogEntry};
pub use config::TapConfig;
pub use errors::TapError;
pub use singer::{JsonLinesWriter, Message, MessageWriter};
pub use streams::{StreamDefinition, StreamRegistry};
pub use sync::{sync, SyncSummary};
pub use types::{Record, Row, StreamId};
pub use wordpress::{HandlerRegistry, StreamHandler, WordPressClient};
