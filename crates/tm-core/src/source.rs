//! Content providers for migration artifacts.
//!
//! A [`MigrationSource`] answers two questions: what is directly inside a
//! directory, and what bytes does a file hold. [`DirSource`] answers them from
//! the filesystem and [`EmbeddedSource`] from files compiled into the binary,
//! so the loader never cares where artifacts live.

use crate::error::{CoreError, CoreResult};
use rust_embed::RustEmbed;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::path::PathBuf;

/// One entry directly inside a source directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceEntry {
    /// File or directory name, without any leading path
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Path → listing and path → bytes capability over a tree of artifacts.
///
/// Paths are `/`-separated and relative to the provider's root; `""` and `"."`
/// both name the root itself. A filesystem provider also accepts absolute paths.
pub trait MigrationSource: Send + Sync {
    /// List the entries directly inside `dir` (no recursion, unspecified order).
    fn list(&self, dir: &str) -> CoreResult<Vec<SourceEntry>>;

    /// Read the full contents of the file at `path`.
    fn read(&self, path: &str) -> CoreResult<Vec<u8>>;

    /// Human-readable description used in log lines.
    fn describe(&self) -> String;

    /// Read every non-directory entry directly inside `dir`.
    ///
    /// Returns `(file name, contents)` pairs in enumeration order.
    fn read_entries(&self, dir: &str) -> CoreResult<Vec<(String, Vec<u8>)>> {
        self.list(dir)?
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| {
                let bytes = self.read(&join_path(dir, &entry.name))?;
                Ok((entry.name, bytes))
            })
            .collect()
    }
}

/// Join a provider-relative directory and a file name.
pub(crate) fn join_path(dir: &str, name: &str) -> String {
    if normalize_dir(dir).is_empty() {
        name.to_string()
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    }
}

/// Strip surrounding slashes and map `"."` to the root.
fn normalize_dir(dir: &str) -> &str {
    let trimmed = dir.trim_matches('/');
    if trimmed == "." {
        ""
    } else {
        trimmed
    }
}

fn unavailable(path: impl Into<String>, reason: impl ToString) -> CoreError {
    CoreError::SourceUnavailable {
        path: path.into(),
        reason: reason.to_string(),
    }
}

/// Filesystem-backed source rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `path` under the root; absolute paths replace the root.
    fn resolve(&self, path: &str) -> PathBuf {
        if normalize_dir(path).is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl MigrationSource for DirSource {
    fn list(&self, dir: &str) -> CoreResult<Vec<SourceEntry>> {
        let path = self.resolve(dir);
        let display = path.display().to_string();
        let read_dir = std::fs::read_dir(&path).map_err(|e| unavailable(&display, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| unavailable(&display, e))?;
            entries.push(SourceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.path().is_dir(),
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &str) -> CoreResult<Vec<u8>> {
        let path = self.resolve(path);
        std::fs::read(&path).map_err(|e| unavailable(path.display().to_string(), e))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Source serving files compiled into the binary with `rust-embed`.
///
/// ```ignore
/// #[derive(rust_embed::Embed)]
/// #[folder = "db/"]
/// struct Bundle;
///
/// let source = EmbeddedSource::<Bundle>::new();
/// ```
pub struct EmbeddedSource<E> {
    _bundle: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    pub fn new() -> Self {
        Self {
            _bundle: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> MigrationSource for EmbeddedSource<E> {
    fn list(&self, dir: &str) -> CoreResult<Vec<SourceEntry>> {
        let dir = normalize_dir(dir);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        // Embedded bundles only store files; directories are implied by
        // path prefixes, so nested files surface as their first component.
        let mut entries = BTreeSet::new();
        for file in E::iter() {
            let Some(rest) = file.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let entry = match rest.split_once('/') {
                Some((child, _)) => SourceEntry {
                    name: child.to_string(),
                    is_dir: true,
                },
                None => SourceEntry {
                    name: rest.to_string(),
                    is_dir: false,
                },
            };
            entries.insert(entry);
        }

        if entries.is_empty() {
            return Err(unavailable(dir, "directory not found in embedded bundle"));
        }
        Ok(entries.into_iter().collect())
    }

    fn read(&self, path: &str) -> CoreResult<Vec<u8>> {
        let path = normalize_dir(path);
        E::get(path)
            .map(|file| file.data.into_owned())
            .ok_or_else(|| unavailable(path, "file not found in embedded bundle"))
    }

    fn describe(&self) -> String {
        format!("embedded:{}", std::any::type_name::<E>())
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
