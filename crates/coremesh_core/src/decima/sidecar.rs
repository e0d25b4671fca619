use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::decima::{
	BlockKind, ChunkTable, ChunkTableEntry, ChunkTableSource, DecimaError, Guid, GuidIndex, Result, StreamLocation, StreamSemantic,
	VertexStreamSet,
};

/// Return the conventional sidecar path for a core file (`mesh.core` -> `mesh.chunk_tables.json`).
pub fn sidecar_path_for(core_path: &Path) -> PathBuf {
	core_path.with_extension("chunk_tables.json")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidecarDocument {
	#[serde(default)]
	chunk_tables: Option<BTreeMap<String, SidecarTable>>,
	#[serde(default)]
	vertex_sets: Option<BTreeMap<String, SidecarVertexSet>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidecarTable {
	#[serde(default)]
	buffer_offset: u64,
	buffer_size: u64,
	#[serde(default)]
	entries: Vec<SidecarEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidecarEntry {
	stream: u32,
	primitive_guid: String,
	offset: u64,
	length: u64,
	#[serde(default)]
	vertex_count: Option<u32>,
}

#[derive(Deserialize)]
struct SidecarVertexSet {
	#[serde(default)]
	streams: BTreeMap<String, SidecarStream>,
}

#[derive(Deserialize)]
struct SidecarStream {
	#[serde(default)]
	stride: Option<u32>,
	#[serde(default)]
	chunks: Vec<SidecarChunk>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidecarChunk {
	primitive_guid: String,
	offset: u64,
	length: u64,
	#[serde(default)]
	vertex_count: Option<u32>,
}

/// Per-role chunk lists of one vertex stream set; offsets are absolute in the stream file.
#[derive(Debug, Clone)]
struct DescribedStream {
	semantic: StreamSemantic,
	stride: Option<u32>,
	chunks: Vec<DescribedChunk>,
}

#[derive(Debug, Clone, Copy)]
struct DescribedChunk {
	primitive: Guid,
	offset: u64,
	length: u64,
	vertex_count: Option<u32>,
}

/// Chunk tables reconstructed from an external JSON description of one core file.
///
/// Stands in for native decoding until the raw chunk table layout is understood. The document lists
/// `chunkTables` keyed by table GUID, `vertexSets` keyed by vertex stream set GUID, or both; tables
/// described directly win over tables rebuilt from a vertex set.
#[derive(Debug)]
pub struct SidecarChunkTableSource {
	path: Option<PathBuf>,
	tables: HashMap<Guid, ChunkTable>,
	vertex_sets: Vec<(Guid, Vec<DescribedStream>)>,
}

impl SidecarChunkTableSource {
	/// Load a sidecar document from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = fs::read_to_string(path)?;
		let mut source = Self::parse(&text, path)?;
		source.path = Some(path.to_path_buf());
		Ok(source)
	}

	/// Parse an in-memory sidecar document.
	pub fn from_json_str(text: &str) -> Result<Self> {
		Self::parse(text, Path::new("<memory>"))
	}

	fn parse(text: &str, path: &Path) -> Result<Self> {
		let sidecar_error = |source: serde_json::Error| DecimaError::Sidecar {
			path: path.to_path_buf(),
			source,
		};
		let document: SidecarDocument = serde_json::from_str(text).map_err(sidecar_error)?;
		if document.chunk_tables.is_none() && document.vertex_sets.is_none() {
			return Err(sidecar_error(serde::de::Error::custom("document has neither `chunkTables` nor `vertexSets`")));
		}

		let described = document.chunk_tables.unwrap_or_default();
		let mut tables = HashMap::with_capacity(described.len());
		for (key, table) in described {
			let guid: Guid = key.parse()?;
			let mut entries = Vec::with_capacity(table.entries.len());
			for entry in table.entries {
				entries.push(ChunkTableEntry {
					stream_id: entry.stream,
					primitive: entry.primitive_guid.parse()?,
					byte_offset: entry.offset,
					byte_size: entry.length,
					element_count: entry.vertex_count,
				});
			}
			tables.insert(
				guid,
				ChunkTable {
					guid,
					buffer_offset: table.buffer_offset,
					buffer_size: table.buffer_size,
					entries,
				},
			);
		}

		let mut vertex_sets = Vec::new();
		for (key, set) in document.vertex_sets.unwrap_or_default() {
			let guid: Guid = key.parse()?;
			let mut streams = Vec::with_capacity(set.streams.len());
			for (role, stream) in set.streams {
				let semantic = role_semantic(&role).ok_or_else(|| {
					sidecar_error(serde::de::Error::custom(format!("unknown stream role `{role}` in vertex set {guid}")))
				})?;
				let mut chunks = Vec::with_capacity(stream.chunks.len());
				for chunk in stream.chunks {
					chunks.push(DescribedChunk {
						primitive: chunk.primitive_guid.parse()?,
						offset: chunk.offset,
						length: chunk.length,
						vertex_count: chunk.vertex_count,
					});
				}
				streams.push(DescribedStream {
					semantic,
					stride: stream.stride,
					chunks,
				});
			}
			vertex_sets.push((guid, streams));
		}

		tracing::debug!(
			tables = tables.len(),
			vertex_sets = vertex_sets.len(),
			path = %path.display(),
			"loaded chunk table sidecar"
		);
		Ok(Self {
			path: None,
			tables,
			vertex_sets,
		})
	}

	/// Rebuild `table` from every described vertex set whose streams point at it.
	///
	/// Chunk offsets are absolute, so the rebuilt table starts at 0 and ends at its furthest chunk.
	fn table_from_vertex_sets(&self, index: &GuidIndex<'_>, table: Guid) -> Result<Option<ChunkTable>> {
		let mut entries = Vec::new();
		let mut referenced = false;

		for (set_guid, described) in &self.vertex_sets {
			let block = index.resolve_kind(*set_guid, BlockKind::VertexStreamSet)?;
			let set = VertexStreamSet::parse(&block)?;

			for (position, descriptor) in set.streams.iter().enumerate() {
				let StreamLocation::Chunked(chunked) = descriptor.location else {
					continue;
				};
				if chunked.table != table {
					continue;
				}
				referenced = true;

				let Some(stream) = described.iter().find(|stream| stream.semantic == descriptor.semantic) else {
					continue;
				};
				if let Some(stride) = stream.stride.filter(|stride| *stride != descriptor.element_stride) {
					return Err(DecimaError::InvalidStreamLayout {
						owner: *set_guid,
						stream: position,
						detail: format!("sidecar stride {stride} disagrees with descriptor stride {}", descriptor.element_stride),
					});
				}

				entries.extend(stream.chunks.iter().map(|chunk| ChunkTableEntry {
					stream_id: chunked.stream_id,
					primitive: chunk.primitive,
					byte_offset: chunk.offset,
					byte_size: chunk.length,
					element_count: chunk.vertex_count,
				}));
			}
		}

		if !referenced {
			return Ok(None);
		}

		let buffer_size = entries.iter().filter_map(ChunkTableEntry::end).max().unwrap_or(0);
		Ok(Some(ChunkTable {
			guid: table,
			buffer_offset: 0,
			buffer_size,
			entries,
		}))
	}

	/// Return the sidecar path, if loaded from disk.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Return number of chunk tables described directly.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	/// Return number of described vertex stream sets.
	pub fn vertex_set_count(&self) -> usize {
		self.vertex_sets.len()
	}

	/// Return whether the sidecar describes neither chunk tables nor vertex sets.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty() && self.vertex_sets.is_empty()
	}
}

/// Map a `vertexSets` stream role (a semantic label or a stream position) to its semantic.
fn role_semantic(role: &str) -> Option<StreamSemantic> {
	match role.parse::<usize>() {
		Ok(position) => StreamSemantic::for_vertex_stream(position),
		Err(_) => (0..)
			.map_while(StreamSemantic::for_vertex_stream)
			.find(|semantic| semantic.as_str() == role),
	}
}

impl ChunkTableSource for SidecarChunkTableSource {
	fn load(&self, index: &GuidIndex<'_>, table: Guid) -> Result<ChunkTable> {
		index.resolve_kind(table, BlockKind::StreamChunkTable)?;
		let described = match self.tables.get(&table) {
			Some(described) => described.clone(),
			None => self
				.table_from_vertex_sets(index, table)?
				.ok_or(DecimaError::DanglingReference { guid: table })?,
		};
		described.validate()?;
		Ok(described)
	}

	fn label(&self) -> &'static str {
		"sidecar"
	}
}

#[cfg(test)]
mod tests;
