//! Local image handling shared by the fetch and classify paths.
//!
//! - **decode**: Load and decode images with content-based format detection
//! - **discovery**: Find image files in directories
//! - **validate**: Magic-byte checks on downloaded payloads

pub mod decode;
pub mod discovery;
pub mod validate;

// Re-exports for convenient access
pub use decode::{decode_bytes, decode_file};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use validate::is_image_payload;
