// src/fs.rs

// dependencies
use std::fs::{self, Permissions, ReadDir};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Read-only view of a file or directory's metadata.
pub trait FileInfo {
    fn name(&self) -> &str;
    fn is_dir(&self) -> bool;
    fn size(&self) -> u64;
    /// `None` means the modification time is unknown or deliberately hidden.
    fn modified(&self) -> Option<SystemTime>;
    fn permissions(&self) -> &Permissions;
}

/// An open file or directory handed out by a [`FileSystem`].
pub trait File: Read + Seek + Send {
    type Info: FileInfo;

    fn metadata(&self) -> io::Result<Self::Info>;

    /// Reads the next entries of a directory.
    ///
    /// `max_count == 0` returns everything that is left, otherwise at most
    /// `max_count` entries. An empty vector means the listing is exhausted.
    fn read_dir(&mut self, max_count: usize) -> io::Result<Vec<Metadata>>;
}

/// Opens slash-separated, rooted paths such as `/docs/index.html`.
pub trait FileSystem: Send + Sync + 'static {
    type File: File + 'static;

    fn open(&self, name: &str) -> io::Result<Self::File>;
}

// struct type which represents the metadata of a file on disk
#[derive(Clone, Debug)]
pub struct Metadata {
    name: String,
    is_dir: bool,
    size: u64,
    modified: Option<SystemTime>,
    permissions: Permissions,
}

impl Metadata {
    pub fn from_std(name: impl Into<String>, meta: &fs::Metadata) -> Self {
        Metadata {
            name: name.into(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            modified: meta.modified().ok(),
            permissions: meta.permissions(),
        }
    }
}

impl FileInfo for Metadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn permissions(&self) -> &Permissions {
        &self.permissions
    }
}

// struct type which represents a directory on the local disk used as a root
#[derive(Clone, Debug)]
pub struct Dir {
    root: PathBuf,
}

impl Dir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Dir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // map a rooted request name onto the disk, never escaping the root
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let foreign_separator =
            std::path::MAIN_SEPARATOR != '/' && name.contains(std::path::MAIN_SEPARATOR);
        if name.contains('\0') || foreign_separator {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid character in file path",
            ));
        }

        let cleaned = clean_path(name);
        let relative = cleaned.trim_start_matches('/');
        Ok(self.root.join(relative))
    }
}

impl FileSystem for Dir {
    type File = OsFile;

    fn open(&self, name: &str) -> io::Result<OsFile> {
        let path = self.resolve(name)?;
        OsFile::open(path)
    }
}

enum Handle {
    File(fs::File),
    Dir(Option<ReadDir>),
}

// struct type which represents an open file or directory on the local disk
pub struct OsFile {
    path: PathBuf,
    handle: Handle,
}

impl OsFile {
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let meta = fs::metadata(&path)?;
        let handle = if meta.is_dir() {
            Handle::Dir(None)
        } else {
            Handle::File(fs::File::open(&path)?)
        };

        Ok(OsFile { path, handle })
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string())
    }
}

fn is_a_directory() -> io::Error {
    io::Error::other("is a directory")
}

impl Read for OsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.handle {
            Handle::File(file) => file.read(buf),
            Handle::Dir(_) => Err(is_a_directory()),
        }
    }
}

impl Seek for OsFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.handle {
            Handle::File(file) => file.seek(pos),
            Handle::Dir(_) => Err(is_a_directory()),
        }
    }
}

impl File for OsFile {
    type Info = Metadata;

    fn metadata(&self) -> io::Result<Metadata> {
        let meta = match &self.handle {
            Handle::File(file) => file.metadata()?,
            Handle::Dir(_) => fs::metadata(&self.path)?,
        };
        Ok(Metadata::from_std(self.display_name(), &meta))
    }

    fn read_dir(&mut self, max_count: usize) -> io::Result<Vec<Metadata>> {
        let Handle::Dir(state) = &mut self.handle else {
            return Err(io::Error::other("not a directory"));
        };

        if state.is_none() {
            *state = Some(fs::read_dir(&self.path)?);
        }
        let Some(entries) = state.as_mut() else {
            return Ok(Vec::new());
        };

        let mut listed = Vec::new();
        for entry in entries {
            let entry = entry?;
            let meta = entry.metadata()?;
            listed.push(Metadata::from_std(
                entry.file_name().to_string_lossy().into_owned(),
                &meta,
            ));
            if max_count > 0 && listed.len() == max_count {
                break;
            }
        }
        Ok(listed)
    }
}

/// Lexically cleans a slash-separated path, always returning a rooted path.
///
/// `.` segments and empty segments are dropped and `..` removes the previous
/// segment without ever climbing above `/`. A trailing slash is not kept.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}
