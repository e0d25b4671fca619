use crate::decima::{BlockKind, ChunkTable, DecimaError, Guid, GuidIndex, Result, SidecarChunkTableSource};

/// Capability that turns a chunk table GUID into validated entries.
///
/// Every implementation resolves the owning block first and validates with [`ChunkTable::validate`],
/// so callers see the same contract whichever source backs them.
pub trait ChunkTableSource {
	/// Load the chunk table owned by `table`.
	fn load(&self, index: &GuidIndex<'_>, table: Guid) -> Result<ChunkTable>;

	/// Return a short label for diagnostics.
	fn label(&self) -> &'static str;
}

/// Decodes chunk tables from their raw block payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeChunkTableSource;

impl ChunkTableSource for NativeChunkTableSource {
	fn load(&self, index: &GuidIndex<'_>, table: Guid) -> Result<ChunkTable> {
		let block = index.resolve_kind(table, BlockKind::StreamChunkTable)?;
		let decoded = ChunkTable::decode(&block)?;
		decoded.validate()?;
		Ok(decoded)
	}

	fn label(&self) -> &'static str {
		"native"
	}
}

/// Tries native decoding and falls back to a sidecar for unsupported payload revisions.
#[derive(Debug, Default)]
pub struct FallbackChunkTableSource {
	sidecar: Option<SidecarChunkTableSource>,
}

impl FallbackChunkTableSource {
	/// Create a fallback source; without a sidecar it behaves like the native source.
	pub fn new(sidecar: Option<SidecarChunkTableSource>) -> Self {
		Self { sidecar }
	}
}

impl ChunkTableSource for FallbackChunkTableSource {
	fn load(&self, index: &GuidIndex<'_>, table: Guid) -> Result<ChunkTable> {
		match NativeChunkTableSource.load(index, table) {
			Err(DecimaError::UnsupportedVersion { context: "chunk table", tag }) => match &self.sidecar {
				Some(sidecar) => {
					tracing::debug!(%table, revision = tag, "native chunk table unsupported, using sidecar");
					sidecar.load(index, table)
				}
				None => Err(DecimaError::UnsupportedVersion { context: "chunk table", tag }),
			},
			other => other,
		}
	}

	fn label(&self) -> &'static str {
		if self.sidecar.is_some() { "native+sidecar" } else { "native" }
	}
}
