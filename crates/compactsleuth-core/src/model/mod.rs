/// Data model: directories, files, compression types and the registry.
pub mod compression;
pub mod directory;
pub mod file_entry;
pub mod registry;
pub mod size;

pub use compression::CompressionType;
pub use directory::{DirKey, Directory};
pub use file_entry::FileEntry;
pub use registry::{Registry, SharedRegistry, TreeSnapshot};
