use crate::decima::{
	Block, BlockKind, Guid, IndexArray, IndexStream, MeshResource, PrimitiveResource, Result, StreamLocation, VertexArray,
	VertexStreamSet,
};

/// Recognized block decoded into its typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBlock {
	/// `RenderingPrimitiveResource`.
	Primitive(PrimitiveResource),
	/// `RegularSkinnedMeshResource` or `StaticMeshResource`.
	Mesh(MeshResource),
	/// Chunked vertex stream set.
	VertexStreamSet(VertexStreamSet),
	/// Chunked index stream.
	IndexStream(IndexStream),
	/// Chunk table block; entries are decoded through a chunk table source.
	ChunkTable(Guid),
	/// Legacy vertex array.
	VertexArray(VertexArray),
	/// Legacy index array.
	IndexArray(IndexArray),
	/// Block kept opaque.
	Opaque(BlockKind),
}

impl DecodedBlock {
	/// Decode `block` according to its kind.
	pub fn decode(block: &Block<'_>) -> Result<Self> {
		Ok(match block.kind {
			BlockKind::RenderingPrimitive => Self::Primitive(PrimitiveResource::parse(block)?),
			BlockKind::RegularSkinnedMesh | BlockKind::StaticMesh => Self::Mesh(MeshResource::parse(block)?),
			BlockKind::VertexStreamSet => Self::VertexStreamSet(VertexStreamSet::parse(block)?),
			BlockKind::IndexStream => Self::IndexStream(IndexStream::parse(block)?),
			BlockKind::StreamChunkTable => Self::ChunkTable(block.guid),
			BlockKind::VertexArray => Self::VertexArray(VertexArray::parse(block)?),
			BlockKind::IndexArray => Self::IndexArray(IndexArray::parse(block)?),
			other => Self::Opaque(other),
		})
	}

	/// Return same-file GUIDs this block links to, in payload order.
	///
	/// Legacy buffer GUIDs name stream-file buffers, not blocks, and are left out.
	pub fn references(&self) -> Result<Vec<Guid>> {
		let mut out = Vec::new();
		match self {
			Self::Primitive(primitive) => {
				out.extend(primitive.vertex_ref.local_target()?);
				out.extend(primitive.index_ref.local_target()?);
			}
			Self::Mesh(mesh) => {
				for reference in mesh.lods.iter().flatten() {
					out.extend(reference.local_target()?);
				}
			}
			Self::VertexStreamSet(set) => out.extend(set.chunk_tables()),
			Self::IndexStream(stream) => {
				if let StreamLocation::Chunked(chunked) = stream.descriptor.location {
					out.push(chunked.table);
				}
			}
			Self::ChunkTable(_) | Self::VertexArray(_) | Self::IndexArray(_) | Self::Opaque(_) => {}
		}
		Ok(out)
	}
}
