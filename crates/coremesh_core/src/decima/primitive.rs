use crate::decima::bytes::Cursor;
use crate::decima::{Block, BlockKind, DecimaError, Guid, Reference, Result};

/// Decoded `RenderingPrimitiveResource` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveResource {
	/// The primitive block's own GUID.
	pub guid: Guid,
	/// Leading flag word.
	pub flags: u32,
	/// Reference to a `VertexStreamSet` or legacy `VertexArrayResource`.
	pub vertex_ref: Reference,
	/// Reference to an `IndexStream` or legacy `IndexArrayResource`.
	pub index_ref: Reference,
}

impl PrimitiveResource {
	/// Decode a primitive block.
	pub fn parse(block: &Block<'_>) -> Result<Self> {
		let mut cursor = Cursor::new(block.payload);
		let flags = cursor.read_u32()?;
		let vertex_ref = Reference::read(&mut cursor)?;
		let index_ref = Reference::read(&mut cursor)?;

		Ok(Self {
			guid: block.guid,
			flags,
			vertex_ref,
			index_ref,
		})
	}
}

/// Decoded mesh resource: primitive references grouped by LOD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshResource {
	/// The mesh block's own GUID.
	pub guid: Guid,
	/// Skinned or static.
	pub kind: BlockKind,
	/// Primitive references per LOD, finest first.
	pub lods: Vec<Vec<Reference>>,
}

impl MeshResource {
	/// Decode a `RegularSkinnedMeshResource` or `StaticMeshResource` block.
	pub fn parse(block: &Block<'_>) -> Result<Self> {
		let mut cursor = Cursor::new(block.payload);
		let lod_count = cursor.read_u32()?;

		let mut lods = Vec::new();
		for _ in 0..lod_count {
			let primitive_count = cursor.read_u32()?;
			let mut refs = Vec::new();
			for _ in 0..primitive_count {
				refs.push(Reference::read(&mut cursor)?);
			}
			lods.push(refs);
		}

		Ok(Self {
			guid: block.guid,
			kind: block.kind,
			lods,
		})
	}
}

/// One primitive in draw order, with its resolved reference targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRecord {
	/// Position in the mesh's draw order.
	pub primitive_index: usize,
	/// The primitive block's GUID.
	pub guid: Guid,
	/// LOD the primitive belongs to.
	pub lod_level: u32,
	/// Vertex stream set or legacy vertex array GUID.
	pub vertex_guid: Guid,
	/// Index stream or legacy index array GUID, if any.
	pub index_guid: Option<Guid>,
}

impl PrimitiveRecord {
	/// Build a record from a decoded primitive block.
	pub fn new(primitive_index: usize, lod_level: u32, primitive: &PrimitiveResource) -> Result<Self> {
		let vertex_guid = primitive.vertex_ref.local_target()?.ok_or(DecimaError::NullReference {
			owner: primitive.guid,
			field: "vertex",
		})?;
		let index_guid = primitive.index_ref.local_target()?;

		Ok(Self {
			primitive_index,
			guid: primitive.guid,
			lod_level,
			vertex_guid,
			index_guid,
		})
	}
}
