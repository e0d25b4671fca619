use std::fmt;

/// Type hash of `RenderingPrimitiveResource` blocks.
pub const RENDERING_PRIMITIVE_RESOURCE: u64 = 0xEE49_D93D_A4C1_F4B8;
/// Type hash of chunked `VertexStreamSet` blocks.
pub const VERTEX_STREAM_SET: u64 = 0x3AC2_9A12_3FAA_BAB4;
/// Type hash of chunked `IndexStream` blocks.
pub const INDEX_STREAM: u64 = 0x5FE6_33B3_7CED_BF84;
/// Type hash of `StreamChunkTable` blocks.
pub const STREAM_CHUNK_TABLE: u64 = 0x0B0D_03C7_E087_F38E;
/// Type hash of `RegularSkinnedMeshResource` blocks.
pub const REGULAR_SKINNED_MESH_RESOURCE: u64 = 0x36B8_8667_B0A3_3134;
/// Type hash of `StaticMeshResource` blocks.
pub const STATIC_MESH_RESOURCE: u64 = 0xB4CB_2D0E_4D1E_2E80;
/// Type hash of legacy per-primitive `VertexArrayResource` blocks.
pub const VERTEX_ARRAY_RESOURCE: u64 = 0x13D2_D4D0_A8F5_E1C3;
/// Type hash of legacy per-primitive `IndexArrayResource` blocks.
pub const INDEX_ARRAY_RESOURCE: u64 = 0x7C3F_7E5B_2E9A_4D11;

const DATA_BUFFER_RESOURCE: u64 = 0x6319_028A_1355_6F1E;
const SKINNED_MESH_BONE_BINDINGS: u64 = 0xE2A8_1241_8ABC_2172;
const SKINNED_MESH_BONE_BOUNDING_BOXES: u64 = 0xBCE8_4D96_052C_041E;
const SKIN_INFO: u64 = 0x1183_78C2_F191_097A;
const RENDER_EFFECT_RESOURCE: u64 = 0xFE28_43D4_AAD2_55E7;
const CULL_INFO: u64 = 0x8EB2_9E71_F97E_460F;

/// Closed set of block kinds, one per known type hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
	/// One drawable primitive with vertex and index references.
	RenderingPrimitive,
	/// Shared vertex streams partitioned by a chunk table.
	VertexStreamSet,
	/// Shared index stream partitioned by a chunk table.
	IndexStream,
	/// Chunk table describing one physical buffer.
	StreamChunkTable,
	/// Skinned mesh resource listing primitives per LOD.
	RegularSkinnedMesh,
	/// Static mesh resource listing primitives per LOD.
	StaticMesh,
	/// Legacy per-primitive vertex buffer views.
	VertexArray,
	/// Legacy per-primitive index buffer view.
	IndexArray,
	/// Data buffer resource (named for diagnostics only).
	DataBuffer,
	/// Skinned mesh bone bindings (named for diagnostics only).
	SkinnedMeshBoneBindings,
	/// Skinned mesh bone bounding boxes (named for diagnostics only).
	SkinnedMeshBoneBoundingBoxes,
	/// Skinned mesh skin info (named for diagnostics only).
	SkinInfo,
	/// Render effect resource (named for diagnostics only).
	RenderEffect,
	/// Culling and LOD metadata (named for diagnostics only).
	CullInfo,
	/// Any other type hash.
	Unknown(u64),
}

impl BlockKind {
	/// Map a raw type hash to its kind.
	pub fn from_type_id(type_id: u64) -> Self {
		match type_id {
			RENDERING_PRIMITIVE_RESOURCE => Self::RenderingPrimitive,
			VERTEX_STREAM_SET => Self::VertexStreamSet,
			INDEX_STREAM => Self::IndexStream,
			STREAM_CHUNK_TABLE => Self::StreamChunkTable,
			REGULAR_SKINNED_MESH_RESOURCE => Self::RegularSkinnedMesh,
			STATIC_MESH_RESOURCE => Self::StaticMesh,
			VERTEX_ARRAY_RESOURCE => Self::VertexArray,
			INDEX_ARRAY_RESOURCE => Self::IndexArray,
			DATA_BUFFER_RESOURCE => Self::DataBuffer,
			SKINNED_MESH_BONE_BINDINGS => Self::SkinnedMeshBoneBindings,
			SKINNED_MESH_BONE_BOUNDING_BOXES => Self::SkinnedMeshBoneBoundingBoxes,
			SKIN_INFO => Self::SkinInfo,
			RENDER_EFFECT_RESOURCE => Self::RenderEffect,
			CULL_INFO => Self::CullInfo,
			other => Self::Unknown(other),
		}
	}

	/// Return the raw type hash.
	pub fn type_id(self) -> u64 {
		match self {
			Self::RenderingPrimitive => RENDERING_PRIMITIVE_RESOURCE,
			Self::VertexStreamSet => VERTEX_STREAM_SET,
			Self::IndexStream => INDEX_STREAM,
			Self::StreamChunkTable => STREAM_CHUNK_TABLE,
			Self::RegularSkinnedMesh => REGULAR_SKINNED_MESH_RESOURCE,
			Self::StaticMesh => STATIC_MESH_RESOURCE,
			Self::VertexArray => VERTEX_ARRAY_RESOURCE,
			Self::IndexArray => INDEX_ARRAY_RESOURCE,
			Self::DataBuffer => DATA_BUFFER_RESOURCE,
			Self::SkinnedMeshBoneBindings => SKINNED_MESH_BONE_BINDINGS,
			Self::SkinnedMeshBoneBoundingBoxes => SKINNED_MESH_BONE_BOUNDING_BOXES,
			Self::SkinInfo => SKIN_INFO,
			Self::RenderEffect => RENDER_EFFECT_RESOURCE,
			Self::CullInfo => CULL_INFO,
			Self::Unknown(type_id) => type_id,
		}
	}

	/// Return the engine type name, or `None` for unknown hashes.
	pub fn name(self) -> Option<&'static str> {
		Some(match self {
			Self::RenderingPrimitive => "RenderingPrimitiveResource",
			Self::VertexStreamSet => "VertexStreamSet",
			Self::IndexStream => "IndexStream",
			Self::StreamChunkTable => "StreamChunkTable",
			Self::RegularSkinnedMesh => "RegularSkinnedMeshResource",
			Self::StaticMesh => "StaticMeshResource",
			Self::VertexArray => "VertexArrayResource",
			Self::IndexArray => "IndexArrayResource",
			Self::DataBuffer => "DataBufferResource",
			Self::SkinnedMeshBoneBindings => "SkinnedMeshBoneBindings",
			Self::SkinnedMeshBoneBoundingBoxes => "SkinnedMeshBoneBoundingBoxes",
			Self::SkinInfo => "RegularSkinnedMeshResourceSkinInfo",
			Self::RenderEffect => "RenderEffectResource",
			Self::CullInfo => "CullInfo",
			Self::Unknown(_) => return None,
		})
	}

	/// Return whether blocks of this kind take part in GUID resolution.
	pub fn is_indexed(self) -> bool {
		matches!(
			self,
			Self::RenderingPrimitive
				| Self::VertexStreamSet
				| Self::IndexStream
				| Self::StreamChunkTable
				| Self::RegularSkinnedMesh
				| Self::StaticMesh
				| Self::VertexArray
				| Self::IndexArray
		)
	}

	/// Return whether this kind is a mesh resource listing primitives.
	pub fn is_mesh_resource(self) -> bool {
		matches!(self, Self::RegularSkinnedMesh | Self::StaticMesh)
	}
}

impl fmt::Display for BlockKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name() {
			Some(name) => f.write_str(name),
			None => write!(f, "0x{:016X}", self.type_id()),
		}
	}
}
