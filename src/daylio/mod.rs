//! Daylio export normalization
//!
//! - [`schema`]: column declarations per table, loaded from `table_info.json`
//! - [`normalize`]: timestamp fixing, date derivation, mood enrichment
//! - [`tags`]: `dayEntries` tag arrays exploded into `entry_tags`

pub mod normalize;
pub mod schema;
pub mod tags;

pub use normalize::{normalize, Enrichment};
pub use schema::SchemaRegistry;
pub use tags::expand_tags;
