use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::storage::error::{Result, StorageSystemError};

/// Characters accepted as segment separators in a logical path.
pub const SEPARATORS: [char; 2] = ['/', '\\'];

/// How the final segment of a [`LogicalPath`] is interpreted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathKind {
    /// The last segment names a file; only the segments before it are folders.
    #[default]
    File,
    /// Every segment names a folder.
    Directory,
}

/// A path relative to a storage root.
///
/// Both `/` and `\` separate segments and empty segments are dropped, so
/// `"docs//notes\\a.txt"` and `"docs/notes/a.txt"` are the same path. The empty
/// string is the root itself. `.` and `..` are rejected, so a path cannot name
/// anything above its root. Whether a backend follows links out of the root is
/// up to the backend; [`LocalStorageBackend`](crate::storage::LocalStorageBackend)
/// does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct LogicalPath {
    segments: Vec<String>,
}

impl LogicalPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash- or backslash-delimited path.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::from_segments(raw.split(SEPARATORS))
    }

    /// Build a path from already split segments. Empty segments are skipped.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                continue;
            }
            validate_segment(segment)?;
            out.push(segment.to_string());
        }
        Ok(Self { segments: out })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Everything but the final segment. The parent of the root is the root.
    pub fn parent(&self) -> LogicalPath {
        let end = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..end].to_vec(),
        }
    }

    /// The folder segments to walk for a path of the given kind.
    pub fn folder_segments(&self, kind: PathKind) -> &[String] {
        match kind {
            PathKind::Directory => &self.segments,
            PathKind::File => &self.segments[..self.segments.len().saturating_sub(1)],
        }
    }

    /// Append `other` (which may itself contain separators) to this path.
    pub fn join(&self, other: &str) -> Result<LogicalPath> {
        let tail = Self::parse(other)?;
        Ok(self.concat(&tail))
    }

    /// Append exactly one segment. Unlike [`LogicalPath::join`], a name
    /// containing a separator is an error rather than several segments.
    pub fn child(&self, name: &str) -> Result<LogicalPath> {
        if name.is_empty() || name.contains(SEPARATORS) {
            return Err(StorageSystemError::InvalidPath {
                path: name.to_string(),
                reason: "not a single path segment".to_string(),
            });
        }
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Append an already parsed path.
    pub fn concat(&self, other: &LogicalPath) -> LogicalPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Whether `prefix` names this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &LogicalPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Map onto a native path under `base`.
    pub fn to_native(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    let reason = if segment == "." || segment == ".." {
        Some("relative segments are not allowed")
    } else if segment.contains('\0') {
        Some("segment contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageSystemError::InvalidPath {
            path: segment.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for LogicalPath {
    type Err = StorageSystemError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for LogicalPath {
    type Error = StorageSystemError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for LogicalPath {
    type Error = StorageSystemError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&String> for LogicalPath {
    type Error = StorageSystemError;

    fn try_from(value: &String) -> Result<Self> {
        Self::parse(value)
    }
}

/// Anything a storage operation accepts as a path: strings are parsed,
/// [`LogicalPath`] values are used as-is.
pub trait ToLogicalPath {
    fn to_logical_path(&self) -> Result<LogicalPath>;
}

impl ToLogicalPath for str {
    fn to_logical_path(&self) -> Result<LogicalPath> {
        LogicalPath::parse(self)
    }
}

impl ToLogicalPath for String {
    fn to_logical_path(&self) -> Result<LogicalPath> {
        LogicalPath::parse(self)
    }
}

impl ToLogicalPath for LogicalPath {
    fn to_logical_path(&self) -> Result<LogicalPath> {
        Ok(self.clone())
    }
}

impl<T: ToLogicalPath + ?Sized> ToLogicalPath for &T {
    fn to_logical_path(&self) -> Result<LogicalPath> {
        (**self).to_logical_path()
    }
}
