use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decima::{BlockDirectory, BlockIter, BlockKind, Result};

/// Opened `.core` container bytes.
///
/// Every directory and GUID index borrows from one `CoreFile`; nothing is shared between opens.
pub struct CoreFile {
	path: Option<PathBuf>,
	bytes: Vec<u8>,
}

impl CoreFile {
	/// Read a core file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path)?;
		Ok(Self {
			path: Some(path.to_path_buf()),
			bytes,
		})
	}

	/// Wrap in-memory core bytes.
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self { path: None, bytes }
	}

	/// Return the source path, if opened from disk.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Return the mesh name derived from the file stem.
	pub fn mesh_name(&self) -> String {
		self.path
			.as_deref()
			.and_then(Path::file_stem)
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_else(|| "mesh".to_owned())
	}

	/// Return raw bytes backing this file.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Iterate block records lazily.
	pub fn blocks(&self) -> BlockIter<'_> {
		BlockIter::new(&self.bytes)
	}

	/// Read the full ordered block directory.
	pub fn directory(&self) -> Result<BlockDirectory<'_>> {
		BlockDirectory::read(&self.bytes)
	}

	/// Scan basic block distribution statistics.
	pub fn scan_block_stats(&self) -> Result<BlockStats> {
		let mut stats = BlockStats {
			block_count: 0,
			kinds: HashMap::new(),
		};

		for block in self.blocks() {
			let block = block?;
			stats.block_count += 1;
			*stats.kinds.entry(block.kind).or_insert(0) += 1;
		}

		Ok(stats)
	}
}

/// Aggregate block-level counts from a linear scan.
pub struct BlockStats {
	/// Number of parsed blocks.
	pub block_count: u32,
	/// Frequency table by block kind.
	pub kinds: HashMap<BlockKind, u32>,
}

impl BlockStats {
	/// Return whether the chunked vertex layout is present.
	pub fn has_vertex_stream_set(&self) -> bool {
		self.kinds.contains_key(&BlockKind::VertexStreamSet)
	}
}
