use crate::decima::{Block, BlockIter, BlockKind, DecimaError, Result};

/// Leading magic of packed `.bin` archives.
const ARCHIVE_MAGIC: u32 = 0x2030_4050;
/// Leading magic of encrypted packed archives.
const ENCRYPTED_ARCHIVE_MAGIC: u32 = 0x2130_4050;

/// Ordered block sequence of one core file.
///
/// Positions are stable for the lifetime of the directory.
#[derive(Debug)]
pub struct BlockDirectory<'a> {
	blocks: Vec<Block<'a>>,
}

impl<'a> BlockDirectory<'a> {
	/// Read every block record of `bytes`, failing on the first malformed record.
	pub fn read(bytes: &'a [u8]) -> Result<Self> {
		if let Some(magic) = bytes.get(0..4) {
			let magic = u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]);
			if magic == ARCHIVE_MAGIC || magic == ENCRYPTED_ARCHIVE_MAGIC {
				return Err(DecimaError::UnsupportedVersion {
					context: "container",
					tag: u64::from(magic),
				});
			}
		}

		let blocks = BlockIter::new(bytes).collect::<Result<Vec<_>>>()?;
		tracing::debug!(blocks = blocks.len(), "read block directory");
		Ok(Self { blocks })
	}

	/// Return all blocks in declaration order.
	pub fn blocks(&self) -> &[Block<'a>] {
		&self.blocks
	}

	/// Return the block at a directory position.
	pub fn get(&self, position: usize) -> Option<&Block<'a>> {
		self.blocks.get(position)
	}

	/// Iterate `(position, block)` pairs of one kind in declaration order.
	pub fn of_kind(&self, kind: BlockKind) -> impl Iterator<Item = (usize, &Block<'a>)> + '_ {
		self.blocks.iter().enumerate().filter(move |(_, block)| block.kind == kind)
	}

	/// Return whether any block of `kind` is present.
	pub fn has_kind(&self, kind: BlockKind) -> bool {
		self.blocks.iter().any(|block| block.kind == kind)
	}

	/// Return number of blocks.
	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	/// Return whether the directory holds no blocks.
	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}
}
