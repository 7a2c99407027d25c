use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use walkdir::WalkDir;

use crate::errors::SeriesError;
use crate::storage::ObjectStore;
use crate::types::ObjectName;

/// Object store rooted at a local directory.
///
/// Object names map to relative paths under `root`, always reported with `/`
/// separators regardless of platform.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`. The directory must already exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SeriesError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SeriesError::Configuration(format!(
                "storage root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Directory the store is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object name to a path, rejecting names that escape `root`.
    fn resolve(&self, name: &str) -> Result<PathBuf, SeriesError> {
        let relative = Path::new(name);
        let safe = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(SeriesError::InvalidArgument(format!(
                "object name '{name}' is not a relative path inside the store"
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Directory that holds every object name starting with `prefix`.
    ///
    /// `None` when that directory does not exist, in which case nothing can
    /// match.
    fn walk_start(&self, prefix: &str) -> Option<PathBuf> {
        let dir_part = match prefix.rfind('/') {
            Some(pos) => &prefix[..pos],
            None => "",
        };
        if dir_part.is_empty() {
            return Some(self.root.clone());
        }
        self.resolve(dir_part).ok().filter(|path| path.is_dir())
    }

    fn object_name(&self, path: &Path) -> Option<ObjectName> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("/"))
    }

    fn lossy_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl ObjectStore for FsObjectStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectName>, SeriesError> {
        let Some(start) = self.walk_start(prefix) else {
            return Ok(Vec::new());
        };
        let unavailable = |reason: String| SeriesError::StorageUnavailable {
            location: prefix.to_string(),
            reason,
        };
        let mut names = Vec::new();
        for entry in WalkDir::new(&start).follow_links(true) {
            let entry = entry.map_err(|err| unavailable(format!("listing failed: {err}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = self.object_name(entry.path()) else {
                let lossy = self.lossy_name(entry.path());
                if lossy.starts_with(prefix) {
                    return Err(unavailable(format!("object path {lossy} is not valid UTF-8")));
                }
                continue;
            };
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_object(&self, name: &str) -> Result<Bytes, SeriesError> {
        let path = self.resolve(name)?;
        let data = fs::read(&path).map_err(|err| SeriesError::StorageUnavailable {
            location: name.to_string(),
            reason: format!("failed reading {}: {err}", path.display()),
        })?;
        Ok(Bytes::from(data))
    }

    fn write_object(&self, name: &str, data: Bytes) -> Result<(), SeriesError> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SeriesError::PartitionExists(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(&data)?;
        file.sync_all()?;
        Ok(())
    }
}
