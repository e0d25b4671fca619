use std::collections::HashMap;

use crate::decima::{Block, BlockDirectory, BlockKind, DecimaError, DecodedBlock, Guid, Result};

/// GUID to block index over the recognized blocks of one directory.
///
/// Built once per open file and owns the directory it indexes. A GUID always resolves to the same directory position.
#[derive(Debug)]
pub struct GuidIndex<'a> {
	directory: BlockDirectory<'a>,
	by_guid: HashMap<Guid, usize>,
}

impl<'a> GuidIndex<'a> {
	/// Index every block whose kind takes part in resolution.
	pub fn build(directory: BlockDirectory<'a>) -> Result<Self> {
		let blocks = directory.blocks();
		let mut by_guid = HashMap::with_capacity(blocks.len());

		for (position, block) in blocks.iter().enumerate() {
			if !block.kind.is_indexed() {
				continue;
			}

			if by_guid.insert(block.guid, position).is_some() {
				return Err(DecimaError::MalformedContainer {
					at: block.file_offset,
					detail: format!("duplicate guid {}", block.guid),
				});
			}
		}

		tracing::debug!(indexed = by_guid.len(), blocks = blocks.len(), "built guid index");
		Ok(Self { directory, by_guid })
	}

	/// Return the indexed directory.
	pub fn directory(&self) -> &BlockDirectory<'a> {
		&self.directory
	}

	/// Return the directory position of `guid`.
	pub fn position(&self, guid: Guid) -> Option<usize> {
		self.by_guid.get(&guid).copied()
	}

	/// Resolve `guid` to its block.
	pub fn resolve(&self, guid: Guid) -> Result<Block<'a>> {
		let position = self.position(guid).ok_or(DecimaError::DanglingReference { guid })?;
		Ok(self.directory.blocks()[position])
	}

	/// Resolve `guid` and require a specific block kind.
	pub fn resolve_kind(&self, guid: Guid, expected: BlockKind) -> Result<Block<'a>> {
		let block = self.resolve(guid)?;
		if block.kind != expected {
			return Err(DecimaError::UnexpectedBlockKind {
				guid,
				expected,
				got: block.kind,
			});
		}
		Ok(block)
	}

	/// Decode every indexed block and resolve each same-file reference it holds.
	///
	/// Returns the number of references checked.
	pub fn verify_references(&self) -> Result<usize> {
		let mut checked = 0;
		for block in self.directory.blocks() {
			if !block.kind.is_indexed() {
				continue;
			}

			for guid in DecodedBlock::decode(block)?.references()? {
				self.resolve(guid)?;
				checked += 1;
			}
		}
		Ok(checked)
	}

	/// Return number of indexed GUIDs.
	pub fn len(&self) -> usize {
		self.by_guid.len()
	}

	/// Return whether no GUIDs are indexed.
	pub fn is_empty(&self) -> bool {
		self.by_guid.is_empty()
	}
}
