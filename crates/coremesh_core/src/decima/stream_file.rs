use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::decima::{DecimaError, Result};

/// Return the conventional stream path for a core file (`mesh.core` -> `mesh.core.stream`).
pub fn stream_path_for(core_path: &Path) -> PathBuf {
	let mut name = core_path.as_os_str().to_owned();
	name.push(".stream");
	PathBuf::from(name)
}

/// Read-only view over a raw stream file.
pub struct StreamFile {
	inner: StreamInner,
	path: Option<PathBuf>,
}

enum StreamInner {
	Mapped(Mmap),
	Owned(Vec<u8>),
}

impl StreamFile {
	/// Open a stream file memory-mapped.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_opts(path, true)
	}

	/// Open a stream file, memory-mapped or read into an owned buffer.
	pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
		let path = path.as_ref();
		let mut file = File::open(path)?;
		let size = file.metadata()?.len();

		let inner = if use_mmap && size > 0 {
			// Safety: mapped read-only and never written through while this view lives.
			let mmap = unsafe { Mmap::map(&file) }.map_err(|source| DecimaError::MmapFailed {
				path: path.to_path_buf(),
				source,
			})?;
			StreamInner::Mapped(mmap)
		} else {
			let mut bytes = Vec::with_capacity(size as usize);
			file.read_to_end(&mut bytes)?;
			StreamInner::Owned(bytes)
		};

		Ok(Self {
			inner,
			path: Some(path.to_path_buf()),
		})
	}

	/// Wrap in-memory stream bytes.
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self {
			inner: StreamInner::Owned(bytes),
			path: None,
		}
	}

	/// Return the source path, if opened from disk.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Return every byte of the stream.
	pub fn bytes(&self) -> &[u8] {
		match &self.inner {
			StreamInner::Mapped(mmap) => &mmap[..],
			StreamInner::Owned(bytes) => bytes.as_slice(),
		}
	}

	/// Return the stream length in bytes.
	pub fn len(&self) -> u64 {
		self.bytes().len() as u64
	}

	/// Return whether the stream is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes().is_empty()
	}

	/// Borrow exactly `size` bytes at absolute `offset`.
	pub fn read_range(&self, offset: u64, size: u64) -> Result<&[u8]> {
		let available = self.len();
		match offset.checked_add(size) {
			Some(end) if end <= available => Ok(&self.bytes()[offset as usize..end as usize]),
			_ => Err(DecimaError::TruncatedBuffer { offset, size, available }),
		}
	}
}
