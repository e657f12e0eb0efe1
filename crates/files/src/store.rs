//! Content-addressed upload store
//!
//! [`UploadStore`] writes uploaded bytes below a single docs directory, named by
//! their SHA-256 digest and sharded two levels deep:
//!
//! ```text
//! <docs_dir>/sha256/<aa>/<bb>/<hash>[.ext]
//! ```
//!
//! - Identical bytes always land at the same path, so a second upload of the
//!   same content returns the existing file instead of writing it again.
//! - The extension is taken from the sniffed content type when `infer`
//!   recognises it, otherwise from the client-supplied filename.
//! - Writes go to a uniquely named temporary sibling and are moved into place
//!   without overwriting, so concurrent uploads of the same bytes all succeed.

use crate::FilesError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Hashing algorithm recorded on every stored file.
pub const HASH_ALGORITHM: &str = "sha256";

const SENTINEL_FILE_NAME: &str = ".write-sentinel";
const MAX_EXTENSION_LEN: usize = 8;

/// Result of storing one upload.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct StoredFile {
    /// Hexadecimal SHA-256 digest of the content
    pub hash: String,

    /// Path below the docs directory, always `/`-separated
    pub relative_path: String,

    /// Public URL the static file service answers on
    pub url: String,

    pub size_bytes: u64,

    /// Sniffed MIME type; best effort, `None` when unrecognised
    pub media_type: Option<String>,

    /// Filename as sent by the client, or the stored name when none was given
    pub original_filename: String,

    pub stored_at: DateTime<Utc>,

    /// True when the content was already present and nothing was written
    pub deduplicated: bool,
}

impl StoredFile {
    /// Final path segment, e.g. `ab3f…9e.pdf`.
    pub fn stored_name(&self) -> &str {
        file_name_of(&self.relative_path)
    }
}

/// Creates `dir` (recursively) and proves it is writable by creating and
/// removing a sentinel file. Returns the canonical path.
pub fn provision_dir(dir: &Path) -> Result<PathBuf, FilesError> {
    fs::create_dir_all(dir).map_err(|e| {
        FilesError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", dir.display(), e),
        ))
    })?;

    let sentinel = dir.join(SENTINEL_FILE_NAME);
    fs::write(&sentinel, b"ok")
        .map_err(|e| FilesError::NotWritable(format!("{}: {}", dir.display(), e)))?;
    fs::remove_file(&sentinel)
        .map_err(|e| FilesError::NotWritable(format!("{}: {}", dir.display(), e)))?;

    dir.canonicalize().map_err(FilesError::from)
}

/// Upload storage rooted at one docs directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    docs_dir: PathBuf,
    url_prefix: String,
}

impl UploadStore {
    /// Binds a store to an existing directory.
    ///
    /// `url_prefix` is the public path the directory is served under, such as
    /// `/uploads/docs`; a trailing `/` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidRootDirectory`] when `docs_dir` is missing,
    /// is not a directory, or cannot be canonicalised.
    pub fn new(docs_dir: &Path, url_prefix: &str) -> Result<Self, FilesError> {
        if !docs_dir.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Not an existing directory: {}",
                docs_dir.display()
            )));
        }

        let docs_dir = docs_dir.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                docs_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            docs_dir,
            url_prefix: url_prefix.trim_end_matches('/').to_owned(),
        })
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Stores `bytes`, deduplicating on content.
    ///
    /// # Errors
    ///
    /// - [`FilesError::EmptyUpload`] for zero-length input
    /// - [`FilesError::Io`] when the shard directory or file cannot be written
    pub fn store(
        &self,
        bytes: &[u8],
        original_filename: Option<&str>,
    ) -> Result<StoredFile, FilesError> {
        if bytes.is_empty() {
            return Err(FilesError::EmptyUpload);
        }

        let hash = hex::encode(Sha256::digest(bytes));
        let kind = infer::get(bytes);
        let extension = kind
            .map(|k| k.extension().to_owned())
            .or_else(|| original_filename.and_then(extension_from_name));

        let relative_path = relative_path(&hash, extension.as_deref());
        let storage_path = self.docs_dir.join(&relative_path);

        let deduplicated = storage_path.is_file() || !write_atomically(&storage_path, bytes)?;

        let url = format!("{}/{}", self.url_prefix, relative_path);
        let original_filename = original_filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| file_name_of(&relative_path).to_owned());

        Ok(StoredFile {
            hash,
            relative_path,
            url,
            size_bytes: bytes.len() as u64,
            media_type: kind.map(|k| k.mime_type().to_owned()),
            original_filename,
            stored_at: Utc::now(),
            deduplicated,
        })
    }
}

/// `sha256/<aa>/<bb>/<hash>[.ext]`
fn relative_path(hash_hex: &str, extension: Option<&str>) -> String {
    let shard1 = &hash_hex[0..2];
    let shard2 = &hash_hex[2..4];
    match extension {
        Some(ext) => format!("{HASH_ALGORITHM}/{shard1}/{shard2}/{hash_hex}.{ext}"),
        None => format!("{HASH_ALGORITHM}/{shard1}/{shard2}/{hash_hex}"),
    }
}

fn file_name_of(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// Lowercased extension of a client filename, if it is short and alphanumeric.
fn extension_from_name(name: &str) -> Option<String> {
    let file_name = name.rsplit(['/', '\\']).next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Writes `bytes` to `storage_path` unless it already exists. Returns `false` when another
/// writer got there first.
fn write_atomically(storage_path: &Path, bytes: &[u8]) -> Result<bool, FilesError> {
    let Some(parent) = storage_path.parent() else {
        return Err(FilesError::InvalidRootDirectory(format!(
            "Storage path has no parent: {}",
            storage_path.display()
        )));
    };

    fs::create_dir_all(parent).map_err(|e| {
        FilesError::Io(io::Error::new(
            e.kind(),
            format!(
                "Failed to create storage directory {}: {}",
                parent.display(),
                e
            ),
        ))
    })?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        FilesError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create temp file in {}: {}", parent.display(), e),
        ))
    })?;
    temp.write_all(bytes).map_err(|e| {
        FilesError::Io(io::Error::new(
            e.kind(),
            format!("Failed to write file to {}: {}", temp.path().display(), e),
        ))
    })?;

    match temp.persist_noclobber(storage_path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(FilesError::Io(io::Error::new(
            e.error.kind(),
            format!(
                "Failed to move file into {}: {}",
                storage_path.display(),
                e.error
            ),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    fn store_in(temp: &TempDir) -> UploadStore {
        let docs = provision_dir(&temp.path().join("uploads").join("docs")).unwrap();
        UploadStore::new(&docs, "/uploads/docs/").unwrap()
    }

    #[test]
    fn provision_creates_nested_directory_and_removes_sentinel() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("uploads").join("docs");

        let dir = provision_dir(&target).unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join(SENTINEL_FILE_NAME).exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn provision_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("docs");
        provision_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"x").unwrap();

        provision_dir(&target).unwrap();

        assert!(target.join("keep.txt").exists());
    }

    #[test]
    fn provision_fails_when_path_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("uploads");
        fs::write(&blocker, b"not a dir").unwrap();

        let result = provision_dir(&blocker.join("docs"));

        assert!(matches!(result, Err(FilesError::Io(_))));
    }

    #[test]
    fn new_rejects_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = UploadStore::new(&temp.path().join("absent"), "/uploads/docs");
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn store_shards_by_hash_and_builds_url() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let content = b"quote for kitchen repaint";

        let stored = store.store(content, Some("quote.txt")).unwrap();

        let expected_hash = hex::encode(Sha256::digest(content));
        assert_eq!(stored.hash, expected_hash);
        assert_eq!(
            stored.relative_path,
            format!(
                "sha256/{}/{}/{}.txt",
                &expected_hash[0..2],
                &expected_hash[2..4],
                expected_hash
            )
        );
        assert_eq!(stored.url, format!("/uploads/docs/{}", stored.relative_path));
        assert_eq!(stored.size_bytes, content.len() as u64);
        assert_eq!(stored.original_filename, "quote.txt");
        assert!(!stored.deduplicated);

        let on_disk = fs::read(store.docs_dir().join(&stored.relative_path)).unwrap();
        assert_eq!(on_disk, content);
    }

    #[test]
    fn sniffed_type_wins_over_client_extension() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let stored = store.store(PNG_HEADER, Some("photo.jpeg")).unwrap();

        assert!(stored.relative_path.ends_with(".png"));
        assert_eq!(stored.media_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn unsafe_or_missing_extensions_are_dropped() {
        assert_eq!(extension_from_name("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_from_name("../../etc/passwd"), None);
        assert_eq!(extension_from_name("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_from_name(".bashrc"), None);
        assert_eq!(extension_from_name("evil.p/hp"), None);
        assert_eq!(extension_from_name("name.verylongext"), None);
        assert_eq!(extension_from_name("shell.s h"), None);
    }

    #[test]
    fn store_without_filename_has_no_extension() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let stored = store.store(b"plain words", None).unwrap();

        assert_eq!(stored.stored_name(), stored.hash);
        assert_eq!(stored.original_filename, stored.hash);
        assert!(stored.media_type.is_none());
    }

    #[test]
    fn identical_content_is_deduplicated() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let first = store.store(b"same bytes", Some("a.txt")).unwrap();
        let second = store.store(b"same bytes", Some("b.txt")).unwrap();

        assert!(!first.deduplicated);
        assert!(second.deduplicated);
        assert_eq!(first.url, second.url);
        assert_eq!(second.original_filename, "b.txt");

        let shard = store
            .docs_dir()
            .join(Path::new(&first.relative_path).parent().unwrap());
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1);
    }

    #[test]
    fn concurrent_identical_uploads_all_succeed() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let content: Vec<u8> = (0..2 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

        let results: Vec<StoredFile> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| store.store(&content, Some("big.bin"))))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        assert_eq!(results.iter().filter(|r| !r.deduplicated).count(), 1);
        assert!(results.iter().all(|r| r.url == results[0].url));

        let shard = store
            .docs_dir()
            .join(Path::new(&results[0].relative_path).parent().unwrap());
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1);
        let on_disk = fs::read(store.docs_dir().join(&results[0].relative_path)).unwrap();
        assert_eq!(on_disk, content);
    }

    #[test]
    fn empty_upload_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert!(matches!(
            store.store(&[], Some("empty.pdf")),
            Err(FilesError::EmptyUpload)
        ));
    }
}
