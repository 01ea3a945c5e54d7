//! Connection handling and point operations for the vector store.

pub mod client_trait;
pub mod ops;
pub mod session;

pub use client_trait::QdrantClientTrait;
pub use session::StoreSession;
