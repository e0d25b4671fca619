mod block;
mod bytes;
mod chunk;
mod decoded;
mod directory;
mod error;
mod export;
mod file;
mod guid;
mod index;
mod kind;
mod legacy;
mod primitive;
mod reference;
mod resolve;
mod sidecar;
mod slice;
mod source;
mod stream;
mod stream_file;
mod vertex_set;

/// Block record parsing.
pub use block::{Block, BlockIter, GUID_SIZE, RECORD_PREFIX_SIZE};
/// Bounded little-endian cursor.
pub use bytes::Cursor;
/// Chunk table entries and validation.
pub use chunk::{CHUNK_TABLE_REVISION, ChunkTable, ChunkTableEntry};
/// Typed decoding of recognized blocks.
pub use decoded::DecodedBlock;
/// Ordered block directory.
pub use directory::BlockDirectory;
/// Error and result types.
pub use error::{DecimaError, Result};
/// Export guard and legacy write-back.
pub use export::{ExportSummary, PrimitiveBinding, export_mesh, primitives_sharing_vertex_set};
/// Core file access and stats.
pub use file::{BlockStats, CoreFile};
/// Block GUIDs.
pub use guid::Guid;
/// GUID to block index.
pub use index::GuidIndex;
/// Block kinds and type ids.
pub use kind::{
	BlockKind, INDEX_ARRAY_RESOURCE, INDEX_STREAM, REGULAR_SKINNED_MESH_RESOURCE, RENDERING_PRIMITIVE_RESOURCE, STATIC_MESH_RESOURCE,
	STREAM_CHUNK_TABLE, VERTEX_ARRAY_RESOURCE, VERTEX_STREAM_SET,
};
/// Legacy per-primitive buffer views.
pub use legacy::{IndexArray, VertexArray};
/// Primitive and mesh resources.
pub use primitive::{MeshResource, PrimitiveRecord, PrimitiveResource};
/// Embedded references.
pub use reference::{RefKind, Reference};
/// Mesh resolution.
pub use resolve::{
	ChunkTableMode, LegacyBufferViews, MeshOutcome, MeshResolver, PrimitiveGeometrySource, ResolveOptions, ResolvedMesh, ResolvedPrimitive,
	VertexStreamSetRef, chunk_table_source, resolve_batch, resolve_mesh, resolve_path,
};
/// Chunk table sidecar.
pub use sidecar::{SidecarChunkTableSource, sidecar_path_for};
/// Stream slicing and attribute decoding.
pub use slice::{AttributeArrays, ByteRange, ResolvedStream, SliceRequest, slice_stream};
/// Chunk table sources.
pub use source::{ChunkTableSource, FallbackChunkTableSource, NativeChunkTableSource};
/// Stream descriptors.
pub use stream::{ChunkedRef, LegacyBufferView, StreamDescriptor, StreamLocation, StreamSemantic, index_stride, validate_stride};
/// Stream file access.
pub use stream_file::{StreamFile, stream_path_for};
/// Chunked vertex and index streams.
pub use vertex_set::{INDEX_CHUNK_STREAM_ID, IndexStream, VertexStreamSet};
