/// CompactSleuth Core: filesystem indexing and sizing for compression planning.
///
/// This crate contains all business logic with zero UI dependencies.
/// A host (GUI, CLI, service) drives it through a [`ScanSession`].
///
/// # Modules
///
/// - [`model`] - Directory/file records, compression types, the key-indexed registry.
/// - [`scanner`] - The session object, tree analyzer and processing gate.
/// - [`browse`] - Root and child listing operations for the host.
/// - [`platform`] - Mounted volume enumeration.
/// - [`error`] - The crate's error type.
pub mod browse;
pub mod error;
pub mod model;
pub mod platform;
pub mod scanner;

pub use error::ScanError;
pub use scanner::ScanSession;
