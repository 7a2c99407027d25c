/// Filesystem-backed object storage.
pub mod fs;

pub use fs::FsObjectStore;
