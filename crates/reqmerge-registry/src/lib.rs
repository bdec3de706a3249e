//! Package index access: the JSON index document, the on-disk registry
//! cache and the cache-first HTTP client.

pub mod cache;
pub mod client;
pub mod index;

pub use client::RegistryClient;
pub use index::RegistryRecord;
