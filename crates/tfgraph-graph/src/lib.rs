//! # tfgraph graph
//!
//! Neo4j ingestion of Terraform dependency graphs.
//!
//! Provides the Neo4j client and configuration, the idempotent write
//! protocol (constraint, clear, node and edge upserts) behind the
//! [`GraphStore`] seam, and read-side queries over the ingested resources.

pub mod client;
pub mod error;
pub mod memory;
pub mod queries;
pub mod schema;
pub mod store;
pub mod writer;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::GraphStore;
pub use writer::{BatchReport, GraphWriter, IngestOptions, IngestReport};
