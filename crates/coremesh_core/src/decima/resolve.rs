use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::decima::slice::slice_stream;
use crate::decima::{
	BlockDirectory, BlockKind, ByteRange, ChunkTable, ChunkTableSource, CoreFile, DecimaError, FallbackChunkTableSource, Guid, GuidIndex,
	IndexArray, IndexStream, MeshResource, NativeChunkTableSource, PrimitiveRecord, PrimitiveResource, ResolvedStream, Result,
	SidecarChunkTableSource, SliceRequest, StreamDescriptor, StreamFile, StreamLocation, VertexArray, VertexStreamSet, sidecar_path_for,
	stream_path_for,
};

/// Where chunk tables come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkTableMode {
	/// Decode chunk table blocks only.
	Native,
	/// Read chunk tables from the sidecar only.
	Sidecar,
	/// Decode natively, falling back to the sidecar when one exists.
	#[default]
	NativeThenSidecar,
}

/// Caller-supplied paths and policies for resolving one core file.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
	/// Stream file override; defaults to `<core>.stream`.
	pub stream_path: Option<PathBuf>,
	/// Sidecar override; defaults to `<core stem>.chunk_tables.json`.
	pub sidecar_path: Option<PathBuf>,
	/// Chunk table source policy.
	pub chunk_tables: ChunkTableMode,
	/// Memory-map the stream file instead of reading it.
	pub use_mmap: bool,
}

impl Default for ResolveOptions {
	fn default() -> Self {
		Self {
			stream_path: None,
			sidecar_path: None,
			chunk_tables: ChunkTableMode::default(),
			use_mmap: true,
		}
	}
}

/// Geometry source of one primitive, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveGeometrySource {
	/// Per-primitive buffer views.
	Legacy(LegacyBufferViews),
	/// Shared streams partitioned by chunk tables.
	Chunked(VertexStreamSetRef),
}

/// Legacy geometry blocks of one primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyBufferViews {
	/// `VertexArrayResource` GUID.
	pub vertex_array: Guid,
	/// `IndexArrayResource` GUID, if any.
	pub index_array: Option<Guid>,
}

/// Chunked geometry blocks of one primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexStreamSetRef {
	/// `VertexStreamSet` GUID.
	pub vertex_set: Guid,
	/// `IndexStream` GUID, if any.
	pub index_stream: Option<Guid>,
}

/// One primitive with its sliced attribute streams.
#[derive(Debug, Clone)]
pub struct ResolvedPrimitive {
	/// Draw-order record.
	pub record: PrimitiveRecord,
	/// Geometry source the streams came from.
	pub source: PrimitiveGeometrySource,
	/// Vertex count shared by every vertex stream.
	pub vertex_count: usize,
	/// Vertex streams in declaration order.
	pub streams: Vec<ResolvedStream>,
	/// Index stream, if the primitive has one.
	pub indices: Option<ResolvedStream>,
}

impl ResolvedPrimitive {
	/// Return whether this primitive was resolved through chunk tables.
	pub fn is_chunked(&self) -> bool {
		matches!(self.source, PrimitiveGeometrySource::Chunked(_))
	}
}

/// Every primitive of one mesh, in draw order.
#[derive(Debug, Clone)]
pub struct ResolvedMesh {
	/// Mesh name, taken from the core file stem.
	pub name: String,
	/// Primitives in draw order.
	pub primitives: Vec<ResolvedPrimitive>,
}

impl ResolvedMesh {
	/// Return whether any primitive was resolved through chunk tables.
	pub fn is_chunked(&self) -> bool {
		self.primitives.iter().any(ResolvedPrimitive::is_chunked)
	}
}

/// Per-file outcome of a batch run.
#[derive(Debug)]
pub struct MeshOutcome {
	/// Core file path.
	pub path: PathBuf,
	/// Resolved mesh or the failure that stopped this file.
	pub result: Result<ResolvedMesh>,
}

/// Resolver state for one open core/stream pair.
///
/// Chunk tables are cached per GUID; the cache dies with the resolver.
pub struct MeshResolver<'a> {
	index: GuidIndex<'a>,
	stream: &'a StreamFile,
	source: &'a dyn ChunkTableSource,
	tables: HashMap<Guid, ChunkTable>,
}

impl<'a> MeshResolver<'a> {
	/// Read the directory and build the GUID index of `core`.
	pub fn new(core: &'a CoreFile, stream: &'a StreamFile, source: &'a dyn ChunkTableSource) -> Result<Self> {
		let index = GuidIndex::build(core.directory()?)?;
		Ok(Self {
			index,
			stream,
			source,
			tables: HashMap::new(),
		})
	}

	/// Return the block directory.
	pub fn directory(&self) -> &BlockDirectory<'a> {
		self.index.directory()
	}

	/// Return the GUID index.
	pub fn index(&self) -> &GuidIndex<'a> {
		&self.index
	}

	/// List primitives in draw order.
	///
	/// The first mesh resource defines order and LODs; without one, primitive blocks are taken in directory order at LOD 0.
	pub fn primitive_records(&self) -> Result<Vec<PrimitiveRecord>> {
		let mesh_block = self.directory().blocks().iter().find(|block| block.kind.is_mesh_resource());

		let mut records = Vec::new();
		if let Some(mesh_block) = mesh_block {
			let mesh = MeshResource::parse(mesh_block)?;
			for (lod, refs) in mesh.lods.iter().enumerate() {
				for reference in refs {
					let guid = reference.local_target()?.ok_or(DecimaError::NullReference {
						owner: mesh.guid,
						field: "primitive",
					})?;
					let block = self.index.resolve_kind(guid, BlockKind::RenderingPrimitive)?;
					let primitive = PrimitiveResource::parse(&block)?;
					records.push(PrimitiveRecord::new(records.len(), lod as u32, &primitive)?);
				}
			}
		} else {
			for (_, block) in self.directory().of_kind(BlockKind::RenderingPrimitive) {
				let primitive = PrimitiveResource::parse(block)?;
				records.push(PrimitiveRecord::new(records.len(), 0, &primitive)?);
			}
		}

		Ok(records)
	}

	/// Decide the geometry source of `record` from the kind of its vertex target.
	pub fn geometry_source(&self, record: &PrimitiveRecord) -> Result<PrimitiveGeometrySource> {
		let vertex = self.index.resolve(record.vertex_guid)?;
		match vertex.kind {
			BlockKind::VertexStreamSet => Ok(PrimitiveGeometrySource::Chunked(VertexStreamSetRef {
				vertex_set: record.vertex_guid,
				index_stream: record.index_guid,
			})),
			BlockKind::VertexArray => Ok(PrimitiveGeometrySource::Legacy(LegacyBufferViews {
				vertex_array: record.vertex_guid,
				index_array: record.index_guid,
			})),
			got => Err(DecimaError::UnexpectedBlockKind {
				guid: record.vertex_guid,
				expected: BlockKind::VertexStreamSet,
				got,
			}),
		}
	}

	/// Resolve every primitive; the first failing primitive fails the mesh.
	pub fn resolve_mesh(&mut self, name: &str) -> Result<ResolvedMesh> {
		let records = self.primitive_records()?;
		let mut primitives = Vec::with_capacity(records.len());
		for record in &records {
			primitives.push(self.resolve_primitive(record)?);
		}

		tracing::info!(mesh = name, primitives = primitives.len(), source = self.source.label(), "resolved mesh");
		Ok(ResolvedMesh {
			name: name.to_owned(),
			primitives,
		})
	}

	/// Resolve and slice one primitive.
	pub fn resolve_primitive(&mut self, record: &PrimitiveRecord) -> Result<ResolvedPrimitive> {
		let source = self.geometry_source(record)?;
		let (streams, indices) = match source {
			PrimitiveGeometrySource::Chunked(chunked) => self.resolve_chunked(record, chunked)?,
			PrimitiveGeometrySource::Legacy(legacy) => self.resolve_legacy(legacy)?,
		};

		let vertex_count = streams.first().map(ResolvedStream::element_count).unwrap_or(0);
		if let Some(position) = streams.iter().position(|stream| stream.element_count() != vertex_count) {
			return Err(DecimaError::InvalidStreamLayout {
				owner: record.vertex_guid,
				stream: position,
				detail: format!(
					"{} elements disagree with vertex count {vertex_count}",
					streams[position].element_count()
				),
			});
		}

		tracing::debug!(
			primitive = record.primitive_index,
			guid = %record.guid,
			lod = record.lod_level,
			vertex_count,
			"resolved primitive"
		);
		Ok(ResolvedPrimitive {
			record: *record,
			source,
			vertex_count,
			streams,
			indices,
		})
	}

	fn resolve_chunked(
		&mut self,
		record: &PrimitiveRecord,
		chunked: VertexStreamSetRef,
	) -> Result<(Vec<ResolvedStream>, Option<ResolvedStream>)> {
		let block = self.index.resolve_kind(chunked.vertex_set, BlockKind::VertexStreamSet)?;
		let set = VertexStreamSet::parse(&block)?;

		let vertex_tables = set.chunk_tables();
		for table in vertex_tables.iter().copied() {
			let stream_ids: Vec<u32> = set
				.streams
				.iter()
				.filter_map(|stream| match stream.location {
					StreamLocation::Chunked(chunked) if chunked.table == table => Some(chunked.stream_id),
					_ => None,
				})
				.collect();
			self.chunk_table(table)?.require_streams(record.guid, &stream_ids)?;
		}

		let mut streams = Vec::with_capacity(set.streams.len());
		for (position, descriptor) in set.streams.iter().enumerate() {
			streams.push(self.slice_chunked(set.guid, position, descriptor, record.guid)?);
		}

		let indices = match chunked.index_stream {
			Some(guid) => {
				let block = self.index.resolve_kind(guid, BlockKind::IndexStream)?;
				let index_stream = IndexStream::parse(&block)?;
				if let StreamLocation::Chunked(chunked) = index_stream.descriptor.location {
					// Index chunks are keyed by stream id 0, which collides with the position stream.
					if vertex_tables.contains(&chunked.table) {
						return Err(DecimaError::InvalidStreamLayout {
							owner: index_stream.guid,
							stream: 0,
							detail: format!("index stream shares chunk table {} with vertex set {}", chunked.table, set.guid),
						});
					}
					self.chunk_table(chunked.table)?.require_streams(record.guid, &[chunked.stream_id])?;
				}
				Some(self.slice_chunked(index_stream.guid, 0, &index_stream.descriptor, record.guid)?)
			}
			None => None,
		};

		Ok((streams, indices))
	}

	fn resolve_legacy(&self, legacy: LegacyBufferViews) -> Result<(Vec<ResolvedStream>, Option<ResolvedStream>)> {
		let block = self.index.resolve_kind(legacy.vertex_array, BlockKind::VertexArray)?;
		let array = VertexArray::parse(&block)?;

		let mut streams = Vec::with_capacity(array.streams.len());
		for (position, descriptor) in array.streams.iter().enumerate() {
			streams.push(self.slice_legacy(array.guid, position, descriptor)?);
		}

		let indices = match legacy.index_array {
			Some(guid) => {
				let block = self.index.resolve_kind(guid, BlockKind::IndexArray)?;
				let index_array = IndexArray::parse(&block)?;
				Some(self.slice_legacy(index_array.guid, 0, &index_array.descriptor)?)
			}
			None => None,
		};

		Ok((streams, indices))
	}

	fn slice_chunked(&mut self, owner: Guid, position: usize, descriptor: &StreamDescriptor, primitive: Guid) -> Result<ResolvedStream> {
		let StreamLocation::Chunked(chunked) = descriptor.location else {
			return Err(DecimaError::InvalidStreamLayout {
				owner,
				stream: position,
				detail: "expected a chunk table reference".to_owned(),
			});
		};

		let table = self.chunk_table(chunked.table)?;
		let (entry_idx, entry) = table.entry_for(chunked.stream_id, primitive).ok_or_else(|| DecimaError::ChunkTableInconsistent {
			table: chunked.table,
			entries: Vec::new(),
			detail: format!("no entry for stream {} of primitive {primitive}", chunked.stream_id),
		})?;
		let offset = table.buffer_offset.checked_add(entry.byte_offset).ok_or_else(|| DecimaError::ChunkTableInconsistent {
			table: chunked.table,
			entries: vec![entry_idx],
			detail: "absolute offset overflows".to_owned(),
		})?;

		let request = SliceRequest {
			owner,
			stream: position,
			semantic: descriptor.semantic,
			stride: descriptor.element_stride,
			range: ByteRange {
				offset,
				size: entry.byte_size,
			},
			declared_count: entry.element_count,
		};
		slice_stream(self.stream, &request)
	}

	fn slice_legacy(&self, owner: Guid, position: usize, descriptor: &StreamDescriptor) -> Result<ResolvedStream> {
		let StreamLocation::Legacy(view) = descriptor.location else {
			return Err(DecimaError::InvalidStreamLayout {
				owner,
				stream: position,
				detail: "expected a legacy buffer view".to_owned(),
			});
		};

		let request = SliceRequest {
			owner,
			stream: position,
			semantic: descriptor.semantic,
			stride: view.stride,
			range: ByteRange {
				offset: view.offset,
				size: view.length,
			},
			declared_count: Some(descriptor.element_count),
		};
		slice_stream(self.stream, &request)
	}

	fn chunk_table(&mut self, guid: Guid) -> Result<&ChunkTable> {
		if !self.tables.contains_key(&guid) {
			let table = self.source.load(&self.index, guid)?;
			tracing::debug!(table = %guid, entries = table.entries.len(), source = self.source.label(), "loaded chunk table");
			self.tables.insert(guid, table);
		}
		Ok(&self.tables[&guid])
	}
}

/// Resolve the mesh of an already opened core/stream pair.
pub fn resolve_mesh(core: &CoreFile, stream: &StreamFile, source: &dyn ChunkTableSource) -> Result<ResolvedMesh> {
	let mut resolver = MeshResolver::new(core, stream, source)?;
	resolver.resolve_mesh(&core.mesh_name())
}

/// Build the chunk table source selected by `options` for `core_path`.
pub fn chunk_table_source(core_path: &Path, options: &ResolveOptions) -> Result<Box<dyn ChunkTableSource>> {
	let sidecar_path = options.sidecar_path.clone().unwrap_or_else(|| sidecar_path_for(core_path));
	Ok(match options.chunk_tables {
		ChunkTableMode::Native => Box::new(NativeChunkTableSource),
		ChunkTableMode::Sidecar => Box::new(SidecarChunkTableSource::open(&sidecar_path)?),
		ChunkTableMode::NativeThenSidecar => {
			let sidecar = if sidecar_path.is_file() {
				Some(SidecarChunkTableSource::open(&sidecar_path)?)
			} else {
				None
			};
			Box::new(FallbackChunkTableSource::new(sidecar))
		}
	})
}

/// Open and resolve one core file with its stream file and chunk table source.
pub fn resolve_path(core_path: &Path, options: &ResolveOptions) -> Result<ResolvedMesh> {
	let core = CoreFile::open(core_path)?;
	let stream_path = options.stream_path.clone().unwrap_or_else(|| stream_path_for(core_path));
	let stream = StreamFile::open_opts(&stream_path, options.use_mmap)?;
	let source = chunk_table_source(core_path, options)?;
	resolve_mesh(&core, &stream, source.as_ref())
}

/// Resolve each core file independently; one failure never stops the rest.
pub fn resolve_batch(paths: &[PathBuf], options: &ResolveOptions) -> Vec<MeshOutcome> {
	paths
		.iter()
		.map(|path| {
			let result = resolve_path(path, options);
			if let Err(err) = &result {
				tracing::warn!(path = %path.display(), fatal = err.is_fatal(), "mesh failed: {err}");
			}
			MeshOutcome {
				path: path.clone(),
				result,
			}
		})
		.collect()
}

#[cfg(test)]
mod tests;
