//! Everything around the engine that touches the filesystem: turning a
//! folder of markdown notes into documents, and timing queries against them.

pub mod bench;
pub mod loader;
pub mod logging;

pub use loader::{add_documents_from_path, load_documents};
