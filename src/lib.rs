#![warn(missing_docs)] // Enforce documentation for all public items

//! `renderstore_lib` is the library powering the `renderstore-cli` application.
//!
//! It provides the components for:
//! - Configuration management (`config`)
//! - Connecting to the Qdrant vector store (`store::session`, `store::client_trait`)
//! - Point-level store operations (`store::ops`)
//! - Dataset directory layout and deterministic ids (`dataset`)
//! - Loading datasets into the store (`loader`)
//! - The captions CSV index (`captions`, `checksum`)
//! - Error handling (`error`)
//!
//! ## Overview
//!
//! The library moves a rendered-object dataset into two Qdrant collections:
//! one point per render image and one aggregated point per object, each
//! carrying a named 512-float embedding slot plus payload (dataset UID,
//! caption, source file). The CLI layers commands on top for bootstrapping
//! collections, loading datasets, watching upload progress, and inspecting or
//! searching stored points.
//!
//! Commands talk to the store through [`store::StoreSession`], which probes
//! liveness before any work and releases its channel when dropped. The
//! [`store::QdrantClientTrait`] seam keeps every handler testable against a
//! generated mock.

// Public modules
/// Caption CSV parsing and download.
pub mod captions;
/// SHA-256 hashing and LFS pointer handling.
pub mod checksum;
/// Command-line interface structure and handlers.
pub mod cli;
/// Configuration management for the application.
pub mod config;
/// Shared constants used across the library.
pub mod constants;
/// Dataset directory layout, sidecar embeddings, and deterministic ids.
pub mod dataset;
/// Defines the core error types and Result alias.
pub mod error;
/// The dataset load pipeline.
pub mod loader;
/// Vector store sessions and point operations.
pub mod store;

pub use config::{
    get_config_path_or_default, load_config, save_config, AppConfig, CollectionConfig,
    TimeoutConfig,
};
pub use constants::*;
pub use error::{RenderStoreError, Result};
pub use store::{QdrantClientTrait, StoreSession};

pub use captions::CaptionIndex;
pub use dataset::{derive_object_id, derive_render_id, scan_dataset, RenderSet};
pub use loader::{load_dataset, LoadSummary};

// Re-export qdrant types that appear in this library's public signatures
pub use qdrant_client::qdrant::{
    CollectionInfo, CountPoints, CountResponse, DeletePoints, GetPoints, GetResponse,
    HealthCheckReply, PointId, PointStruct, PointsOperationResponse, RetrievedPoint, ScoredPoint,
    SearchPoints, SearchResponse, UpsertPoints, Value, Vectors, VectorsOutput,
};

#[macro_use]
extern crate log;
