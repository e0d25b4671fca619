use std::path::PathBuf;

use thiserror::Error;

use crate::decima::{BlockKind, Guid};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DecimaError>;

/// Errors produced while reading, resolving, slicing, and exporting `.core` meshes.
#[derive(Debug, Error)]
pub enum DecimaError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Stream file could not be memory-mapped.
	#[error("memory map failed for {}: {source}", .path.display())]
	MmapFailed {
		/// Stream file path.
		path: PathBuf,
		/// Underlying mapping failure.
		source: std::io::Error,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Block directory is inconsistent with the file contents.
	#[error("malformed container at offset {at}: {detail}")]
	MalformedContainer {
		/// File offset of the offending record.
		at: usize,
		/// Human-readable description of the inconsistency.
		detail: String,
	},
	/// Recognized format revision that this reader does not handle.
	#[error("unsupported {context} revision 0x{tag:x}")]
	UnsupportedVersion {
		/// Which structure carried the revision tag.
		context: &'static str,
		/// Raw revision tag.
		tag: u64,
	},
	/// GUID has no block in the current session's index.
	#[error("dangling reference {guid}")]
	DanglingReference {
		/// Unresolved GUID.
		guid: Guid,
	},
	/// Required reference field was null.
	#[error("null {field} reference on {owner}")]
	NullReference {
		/// GUID of the block holding the reference.
		owner: Guid,
		/// Reference field name.
		field: &'static str,
	},
	/// GUID resolved to a block of another kind than the caller expected.
	#[error("block {guid} is {got}, expected {expected}")]
	UnexpectedBlockKind {
		/// Resolved GUID.
		guid: Guid,
		/// Kind required by the caller.
		expected: BlockKind,
		/// Kind found in the directory.
		got: BlockKind,
	},
	/// Stream stride, count, or semantic does not match the expected layout.
	#[error("invalid stream layout in {owner} stream {stream}: {detail}")]
	InvalidStreamLayout {
		/// GUID of the block declaring the stream.
		owner: Guid,
		/// Stream position inside the declaring block.
		stream: usize,
		/// Human-readable description of the mismatch.
		detail: String,
	},
	/// Chunk table entries overlap, exceed their buffer, or miss a referenced stream.
	#[error("chunk table {table} inconsistent at entries {entries:?}: {detail}")]
	ChunkTableInconsistent {
		/// Chunk table GUID.
		table: Guid,
		/// Offending entry indices, in table order.
		entries: Vec<usize>,
		/// Human-readable description of the violation.
		detail: String,
	},
	/// Stream file is shorter than a requested range.
	#[error("truncated buffer: range {offset}+{size} exceeds stream length {available}")]
	TruncatedBuffer {
		/// Absolute start of the requested range.
		offset: u64,
		/// Requested byte count.
		size: u64,
		/// Stream file length.
		available: u64,
	},
	/// Export was attempted on a mesh resolved through shared chunked streams.
	#[error("chunked export unsupported for {mesh}: shared streams are referenced by {}", .objects.join(", "))]
	ChunkedExportUnsupported {
		/// Mesh name.
		mesh: String,
		/// Object names of every primitive sharing the offending vertex stream set.
		objects: Vec<String>,
	},
	/// Chunk-table sidecar could not be parsed.
	#[error("sidecar {}: {source}", .path.display())]
	Sidecar {
		/// Sidecar path, or `<memory>` for in-memory documents.
		path: PathBuf,
		/// JSON parse failure.
		source: serde_json::Error,
	},
	/// GUID text could not be parsed.
	#[error("invalid guid: {value}")]
	InvalidGuid {
		/// Offending text.
		value: String,
	},
}

impl DecimaError {
	/// Return whether this failure stops processing of the whole file.
	///
	/// Everything else is recoverable at mesh granularity.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Io(_) | Self::MmapFailed { .. })
	}
}
