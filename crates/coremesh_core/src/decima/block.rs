use std::ops::Range;

use crate::decima::bytes::Cursor;
use crate::decima::{BlockKind, DecimaError, Guid, Result};

/// Bytes before the size-counted part of a record: type hash plus size word.
pub const RECORD_PREFIX_SIZE: usize = 12;
/// Bytes of the block's own GUID at the start of the size-counted part.
pub const GUID_SIZE: usize = 16;

/// Borrowed view over one block record.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
	/// Raw type hash.
	pub type_id: u64,
	/// Kind derived from `type_id`.
	pub kind: BlockKind,
	/// The block's own GUID.
	pub guid: Guid,
	/// Payload bytes following the GUID.
	pub payload: &'a [u8],
	/// Absolute byte offset where this record starts.
	pub file_offset: usize,
	/// Declared size of GUID plus payload.
	pub size: u32,
}

impl Block<'_> {
	/// Return the absolute byte range of the full record.
	pub fn byte_range(&self) -> Range<usize> {
		self.file_offset..self.file_offset + RECORD_PREFIX_SIZE + self.size as usize
	}
}

/// Iterator over contiguous block records.
pub struct BlockIter<'a> {
	cursor: Cursor<'a>,
	done: bool,
}

impl<'a> BlockIter<'a> {
	/// Create a block iterator over a whole core file.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			cursor: Cursor::new(bytes),
			done: false,
		}
	}

	fn read_block(&mut self) -> Result<Block<'a>> {
		let file_offset = self.cursor.pos();
		let rem = self.cursor.remaining();
		if rem < RECORD_PREFIX_SIZE {
			return Err(DecimaError::MalformedContainer {
				at: file_offset,
				detail: format!("{rem} trailing bytes cannot hold a record prefix"),
			});
		}

		let type_id = self.cursor.read_u64()?;
		let size = self.cursor.read_u32()?;
		let size_bytes = size as usize;
		if size_bytes < GUID_SIZE {
			return Err(DecimaError::MalformedContainer {
				at: file_offset,
				detail: format!("declared size {size} is smaller than the block guid"),
			});
		}

		let rem = self.cursor.remaining();
		if size_bytes > rem {
			return Err(DecimaError::MalformedContainer {
				at: file_offset,
				detail: format!("declared size {size} exceeds remaining {rem} bytes"),
			});
		}

		let guid = self.cursor.read_guid()?;
		let payload = self.cursor.read_exact(size_bytes - GUID_SIZE)?;

		Ok(Block {
			type_id,
			kind: BlockKind::from_type_id(type_id),
			guid,
			payload,
			file_offset,
			size,
		})
	}
}

impl<'a> Iterator for BlockIter<'a> {
	type Item = Result<Block<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		if self.cursor.remaining() == 0 {
			self.done = true;
			return None;
		}

		let block = self.read_block();
		if block.is_err() {
			self.done = true;
		}
		Some(block)
	}
}

#[cfg(test)]
mod tests;
