// src/access.rs
//
// Decorations over a `FileSystem` that hide listings and modification times.

// dependencies
use crate::fs::{File, FileInfo, FileSystem, Metadata};
use std::any::Any;
use std::fs::Permissions;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::SystemTime;

/// File name whose modification time is never reported.
pub const INDEX_FILE: &str = "index.html";

/// Marker unwound out of [`GuardedFile::read_dir`] when listings are disabled.
///
/// It carries no data; the recovery middleware only checks its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Forbidden;

impl Forbidden {
    /// Unwinds the current stack with a `Forbidden` payload.
    ///
    /// `resume_unwind` skips the panic hook, so nothing is printed.
    pub fn raise() -> ! {
        std::panic::resume_unwind(Box::new(Forbidden))
    }

    pub fn is_payload(payload: &(dyn Any + Send)) -> bool {
        payload.is::<Forbidden>()
    }
}

// struct type which reports no modification time for directories and index pages
#[derive(Clone, Debug)]
pub struct ShimMetadata<I> {
    inner: I,
}

impl<I: FileInfo> ShimMetadata<I> {
    pub fn new(inner: I) -> Self {
        ShimMetadata { inner }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: FileInfo> FileInfo for ShimMetadata<I> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn modified(&self) -> Option<SystemTime> {
        if self.inner.is_dir() || self.inner.name() == INDEX_FILE {
            return None;
        }
        self.inner.modified()
    }

    fn permissions(&self) -> &Permissions {
        self.inner.permissions()
    }
}

// struct type which wraps an open handle and polices directory enumeration
pub struct GuardedFile<F> {
    inner: F,
    dir_listing: bool,
}

impl<F: File> GuardedFile<F> {
    pub fn new(inner: F, dir_listing: bool) -> Self {
        GuardedFile { inner, dir_listing }
    }
}

impl<F: File> Read for GuardedFile<F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<F: File> Seek for GuardedFile<F> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl<F: File> File for GuardedFile<F> {
    type Info = ShimMetadata<F::Info>;

    fn metadata(&self) -> io::Result<Self::Info> {
        self.inner.metadata().map(ShimMetadata::new)
    }

    /// Delegates when listings are enabled, otherwise raises [`Forbidden`].
    fn read_dir(&mut self, max_count: usize) -> io::Result<Vec<Metadata>> {
        if self.dir_listing {
            return self.inner.read_dir(max_count);
        }
        Forbidden::raise()
    }
}

// struct type which hands out guarded handles from an inner filesystem
#[derive(Clone, Debug)]
pub struct GuardedFs<S> {
    inner: S,
    dir_listing: bool,
}

impl<S: FileSystem> GuardedFs<S> {
    pub fn new(inner: S, dir_listing: bool) -> Self {
        GuardedFs { inner, dir_listing }
    }

    pub fn dir_listing(&self) -> bool {
        self.dir_listing
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: FileSystem> FileSystem for GuardedFs<S> {
    type File = GuardedFile<S::File>;

    fn open(&self, name: &str) -> io::Result<Self::File> {
        let file = self.inner.open(name)?;
        Ok(GuardedFile::new(file, self.dir_listing))
    }
}
