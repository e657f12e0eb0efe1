//! SkillnScale upload storage
//!
//! Uploaded documents and photos are stored once, addressed by the SHA-256 of
//! their bytes, and served back as static files.
//!
//! ## Layout
//!
//! ```text
//! uploads/
//! └── docs/
//!     └── sha256/
//!         └── ab/
//!             └── 3f/
//!                 └── ab3f9e….jpg
//! ```
//!
//! The public URL of a stored file mirrors its path below the upload root,
//! e.g. `/uploads/docs/sha256/ab/3f/ab3f9e….jpg`.
//!
//! ## Example Usage
//!
//! ```no_run
//! use sns_files::{provision_dir, UploadStore};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let docs = provision_dir(Path::new("uploads/docs"))?;
//! let store = UploadStore::new(&docs, "/uploads/docs")?;
//! let stored = store.store(b"%PDF-1.4 ...", Some("invoice.pdf"))?;
//! println!("{}", stored.url);
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::{provision_dir, StoredFile, UploadStore, HASH_ALGORITHM};

/// Errors that can occur while storing uploads
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Directory exists but a sentinel file could not be written to it
    #[error("Directory is not writable: {0}")]
    NotWritable(String),

    #[error("Uploaded file is empty")]
    EmptyUpload,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
