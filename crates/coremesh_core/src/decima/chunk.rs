use crate::decima::bytes::Cursor;
use crate::decima::{Block, DecimaError, Guid, Result};

/// Native chunk table layout revision this reader decodes.
pub const CHUNK_TABLE_REVISION: u32 = 1;

/// One slice of a shared physical buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkTableEntry {
	/// Stream id matched against `ChunkedRef::stream_id`.
	pub stream_id: u32,
	/// Primitive the slice belongs to.
	pub primitive: Guid,
	/// Byte offset relative to the buffer start.
	pub byte_offset: u64,
	/// Byte length of the slice.
	pub byte_size: u64,
	/// Element count declared for the slice, if known.
	pub element_count: Option<u32>,
}

impl ChunkTableEntry {
	/// Return the exclusive end offset, or `None` on overflow.
	pub fn end(&self) -> Option<u64> {
		self.byte_offset.checked_add(self.byte_size)
	}
}

/// Partition of one physical buffer across streams and primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTable {
	/// GUID of the owning chunk table block.
	pub guid: Guid,
	/// Absolute offset of the physical buffer inside the stream file.
	pub buffer_offset: u64,
	/// Declared byte size of the physical buffer.
	pub buffer_size: u64,
	/// Entries in table order.
	pub entries: Vec<ChunkTableEntry>,
}

impl ChunkTable {
	/// Decode a chunk table block's native payload.
	///
	/// Payloads with another layout revision fail with `UnsupportedVersion`.
	pub fn decode(block: &Block<'_>) -> Result<Self> {
		let mut cursor = Cursor::new(block.payload);
		let revision = cursor.read_u32()?;
		if revision != CHUNK_TABLE_REVISION {
			return Err(DecimaError::UnsupportedVersion {
				context: "chunk table",
				tag: u64::from(revision),
			});
		}

		let entry_count = cursor.read_u32()?;
		let buffer_offset = cursor.read_u64()?;
		let buffer_size = cursor.read_u64()?;

		let mut entries = Vec::new();
		for _ in 0..entry_count {
			let stream_id = cursor.read_u32()?;
			let element_count = cursor.read_u32()?;
			let byte_offset = cursor.read_u64()?;
			let byte_size = cursor.read_u64()?;
			let primitive = cursor.read_guid()?;
			entries.push(ChunkTableEntry {
				stream_id,
				primitive,
				byte_offset,
				byte_size,
				element_count: Some(element_count),
			});
		}

		Ok(Self {
			guid: block.guid,
			buffer_offset,
			buffer_size,
			entries,
		})
	}

	/// Check that entries stay inside the buffer and never overlap each other.
	pub fn validate(&self) -> Result<()> {
		for (idx, entry) in self.entries.iter().enumerate() {
			match entry.end() {
				Some(end) if end <= self.buffer_size => {}
				_ => {
					return Err(self.inconsistent(
						vec![idx],
						format!(
							"range {}+{} exceeds buffer size {}",
							entry.byte_offset, entry.byte_size, self.buffer_size
						),
					));
				}
			}
		}

		let mut order: Vec<usize> = (0..self.entries.len()).filter(|idx| self.entries[*idx].byte_size > 0).collect();
		order.sort_by_key(|idx| (self.entries[*idx].byte_offset, *idx));

		let mut furthest: Option<(usize, u64)> = None;
		for idx in order {
			let entry = &self.entries[idx];
			let end = entry.byte_offset + entry.byte_size;
			if let Some((prev_idx, prev_end)) = furthest {
				if entry.byte_offset < prev_end {
					let mut pair = vec![prev_idx, idx];
					pair.sort_unstable();
					return Err(self.inconsistent(pair, "entry ranges overlap".to_owned()));
				}
				if end > prev_end {
					furthest = Some((idx, end));
				}
			} else {
				furthest = Some((idx, end));
			}
		}

		Ok(())
	}

	/// Find the entry for one stream of one primitive.
	pub fn entry_for(&self, stream_id: u32, primitive: Guid) -> Option<(usize, &ChunkTableEntry)> {
		self.entries
			.iter()
			.enumerate()
			.find(|(_, entry)| entry.stream_id == stream_id && entry.primitive == primitive)
	}

	/// Require an entry for every listed stream of `primitive`.
	pub fn require_streams(&self, primitive: Guid, stream_ids: &[u32]) -> Result<()> {
		for stream_id in stream_ids {
			if self.entry_for(*stream_id, primitive).is_none() {
				return Err(self.inconsistent(Vec::new(), format!("no entry for stream {stream_id} of primitive {primitive}")));
			}
		}
		Ok(())
	}

	/// Return the distinct primitives with entries, in table order.
	pub fn primitives(&self) -> Vec<Guid> {
		let mut out = Vec::new();
		for entry in &self.entries {
			if !out.contains(&entry.primitive) {
				out.push(entry.primitive);
			}
		}
		out
	}

	fn inconsistent(&self, entries: Vec<usize>, detail: String) -> DecimaError {
		DecimaError::ChunkTableInconsistent {
			table: self.guid,
			entries,
			detail,
		}
	}
}
