//! DDL and row decoders for every table the adapter manages.
//!
//! Each submodule carries the PostgreSQL and SQLite CREATE statements for one
//! table plus a `*_from_row` decoder that maps a normalized row back to the
//! domain type. Migrations assemble the DDL into ordered steps; the adapter
//! uses the decoders on every read path.

pub mod agent;
pub mod cache;
pub mod embedding;
pub mod entity;
pub mod log;
pub mod memory;
pub mod participant;
pub mod relationship;
pub mod room;
pub mod task;
pub mod world;

pub use embedding::EmbeddingDimension;
