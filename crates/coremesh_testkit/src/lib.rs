//! Synthetic `.core`, stream, and sidecar builders shared by workspace tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use uuid::Uuid;

/// Block type ids written by the builders.
pub mod ids {
	/// `RenderingPrimitiveResource`.
	pub const RENDERING_PRIMITIVE_RESOURCE: u64 = 0xEE49_D93D_A4C1_F4B8;
	/// `VertexStreamSet`.
	pub const VERTEX_STREAM_SET: u64 = 0x3AC2_9A12_3FAA_BAB4;
	/// `IndexStream`.
	pub const INDEX_STREAM: u64 = 0x5FE6_33B3_7CED_BF84;
	/// `StreamChunkTable`.
	pub const STREAM_CHUNK_TABLE: u64 = 0x0B0D_03C7_E087_F38E;
	/// `RegularSkinnedMeshResource`.
	pub const REGULAR_SKINNED_MESH_RESOURCE: u64 = 0x36B8_8667_B0A3_3134;
	/// `VertexArrayResource`.
	pub const VERTEX_ARRAY_RESOURCE: u64 = 0x13D2_D4D0_A8F5_E1C3;
	/// `IndexArrayResource`.
	pub const INDEX_ARRAY_RESOURCE: u64 = 0x7C3F_7E5B_2E9A_4D11;
	/// Id no reader recognizes.
	pub const UNRECOGNIZED: u64 = 0x0123_4567_89AB_CDEF;
}

/// Build a distinct GUID in on-disk byte order.
pub fn guid(n: u8) -> [u8; 16] {
	let mut bytes = [0; 16];
	bytes[0] = n;
	bytes[15] = n;
	bytes
}

/// Return the hyphenated text form of [`guid`].
pub fn guid_string(n: u8) -> String {
	Uuid::from_bytes_le(guid(n)).hyphenated().to_string()
}

/// Appends block records into a core file image.
#[derive(Debug, Default)]
pub struct CoreWriter {
	bytes: Vec<u8>,
}

impl CoreWriter {
	/// Start an empty core file.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append one `type_id, size, guid, payload` record.
	pub fn block(mut self, type_id: u64, guid: [u8; 16], payload: &[u8]) -> Self {
		self.bytes.extend_from_slice(&type_id.to_le_bytes());
		self.bytes.extend_from_slice(&(16 + payload.len() as u32).to_le_bytes());
		self.bytes.extend_from_slice(&guid);
		self.bytes.extend_from_slice(payload);
		self
	}

	/// Return the file image.
	pub fn finish(self) -> Vec<u8> {
		self.bytes
	}
}

/// Encode an internal reference.
pub fn internal_ref(target: [u8; 16]) -> Vec<u8> {
	let mut out = vec![1];
	out.extend_from_slice(&target);
	out
}

/// Encode a null reference.
pub fn null_ref() -> Vec<u8> {
	vec![0; 17]
}

/// Encode a `RenderingPrimitiveResource` payload.
pub fn primitive_payload(vertex: [u8; 16], index: Option<[u8; 16]>) -> Vec<u8> {
	let mut out = 0_u32.to_le_bytes().to_vec();
	out.extend(internal_ref(vertex));
	out.extend(index.map(internal_ref).unwrap_or_else(null_ref));
	out
}

/// Encode a mesh resource payload with one primitive list per LOD.
pub fn mesh_payload(lods: &[&[[u8; 16]]]) -> Vec<u8> {
	let mut out = (lods.len() as u32).to_le_bytes().to_vec();
	for lod in lods {
		out.extend_from_slice(&(lod.len() as u32).to_le_bytes());
		for primitive in *lod {
			out.extend(internal_ref(*primitive));
		}
	}
	out
}

/// One vertex stream descriptor of a `VertexStreamSet`.
#[derive(Debug, Clone, Copy)]
pub struct StreamRow {
	/// Record stride.
	pub stride: u32,
	/// Stream id inside the chunk table.
	pub stream_id: u32,
	/// Chunk table GUID.
	pub table: [u8; 16],
}

/// Encode a `VertexStreamSet` payload.
pub fn vertex_set_payload(vertex_count: u32, streams: &[StreamRow]) -> Vec<u8> {
	let mut out = Vec::new();
	for word in [vertex_count, streams.len() as u32, 0, 0] {
		out.extend_from_slice(&word.to_le_bytes());
	}
	for (position, stream) in streams.iter().enumerate() {
		if position == 0 {
			out.extend_from_slice(&[0; 8]);
		}
		for word in [0, stream.stride, stream.stream_id, 0] {
			out.extend_from_slice(&word.to_le_bytes());
		}
		out.extend_from_slice(&stream.table);
		if position == 0 {
			out.extend_from_slice(&[0; 8]);
		}
	}
	out
}

/// Encode an `IndexStream` payload; `format` 0 is u16 and 1 is u32.
pub fn index_stream_payload(index_count: u32, format: u32, table: [u8; 16]) -> Vec<u8> {
	let mut out = Vec::new();
	for word in [index_count, 0, format, 0] {
		out.extend_from_slice(&word.to_le_bytes());
	}
	out.extend_from_slice(&table);
	out
}

/// One chunk table entry.
#[derive(Debug, Clone, Copy)]
pub struct ChunkRow {
	/// Stream id.
	pub stream_id: u32,
	/// Element count.
	pub element_count: u32,
	/// Offset relative to the buffer start.
	pub offset: u64,
	/// Byte length.
	pub size: u64,
	/// Owning primitive GUID.
	pub primitive: [u8; 16],
}

/// Encode a revision 1 `StreamChunkTable` payload.
pub fn chunk_table_payload(buffer_offset: u64, buffer_size: u64, rows: &[ChunkRow]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(&1_u32.to_le_bytes());
	out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
	out.extend_from_slice(&buffer_offset.to_le_bytes());
	out.extend_from_slice(&buffer_size.to_le_bytes());
	for row in rows {
		out.extend_from_slice(&row.stream_id.to_le_bytes());
		out.extend_from_slice(&row.element_count.to_le_bytes());
		out.extend_from_slice(&row.offset.to_le_bytes());
		out.extend_from_slice(&row.size.to_le_bytes());
		out.extend_from_slice(&row.primitive);
	}
	out
}

/// Encode a chunk table payload of a revision the native decoder rejects.
pub fn opaque_chunk_table_payload() -> Vec<u8> {
	let mut out = 0_u32.to_le_bytes().to_vec();
	out.extend_from_slice(&[0xAB; 24]);
	out
}

/// Describe one chunk table in sidecar JSON.
pub fn sidecar_table(buffer_offset: u64, buffer_size: u64, rows: &[ChunkRow]) -> Value {
	let entries: Vec<Value> = rows
		.iter()
		.map(|row| {
			json!({
				"stream": row.stream_id,
				"primitiveGuid": Uuid::from_bytes_le(row.primitive).hyphenated().to_string(),
				"offset": row.offset,
				"length": row.size,
				"vertexCount": row.element_count,
			})
		})
		.collect();
	json!({ "bufferOffset": buffer_offset, "bufferSize": buffer_size, "entries": entries })
}

/// One legacy buffer view.
#[derive(Debug, Clone, Copy)]
pub struct ViewRow {
	/// Legacy semantic tag: 0 position, 1 normal/tangent, 2 colour/UV.
	pub semantic: u32,
	/// Record stride.
	pub stride: u32,
	/// Backing buffer GUID.
	pub buffer: [u8; 16],
	/// Absolute stream offset.
	pub offset: u64,
	/// Byte length.
	pub length: u64,
}

/// Encode a legacy `VertexArrayResource` payload.
pub fn vertex_array_payload(vertex_count: u32, views: &[ViewRow]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(&vertex_count.to_le_bytes());
	out.extend_from_slice(&(views.len() as u32).to_le_bytes());
	for view in views {
		out.extend_from_slice(&view.semantic.to_le_bytes());
		out.extend_from_slice(&view.stride.to_le_bytes());
		out.extend_from_slice(&view.buffer);
		out.extend_from_slice(&view.offset.to_le_bytes());
		out.extend_from_slice(&view.length.to_le_bytes());
	}
	out
}

/// Encode a legacy `IndexArrayResource` payload.
pub fn index_array_payload(index_count: u32, format: u32, buffer: [u8; 16], offset: u64, length: u64) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(&index_count.to_le_bytes());
	out.extend_from_slice(&format.to_le_bytes());
	out.extend_from_slice(&buffer);
	out.extend_from_slice(&offset.to_le_bytes());
	out.extend_from_slice(&length.to_le_bytes());
	out
}

/// Encode a 28-byte position record.
pub fn position_record(position: [f32; 3], weights: [f32; 4]) -> Vec<u8> {
	position.iter().chain(weights.iter()).flat_map(|value| value.to_le_bytes()).collect()
}

/// Encode a 28-byte normal/tangent record.
pub fn normal_record(normal: [f32; 3], tangent: [f32; 4]) -> Vec<u8> {
	normal.iter().chain(tangent.iter()).flat_map(|value| value.to_le_bytes()).collect()
}

/// Encode an 8-byte colour/UV record; UVs are raw f16 bits.
pub fn color_uv_record(color: [u8; 4], uv_bits: [u16; 2]) -> Vec<u8> {
	let mut out = color.to_vec();
	out.extend_from_slice(&uv_bits[0].to_le_bytes());
	out.extend_from_slice(&uv_bits[1].to_le_bytes());
	out
}

/// f16 bits of 0.5.
pub const HALF_0_5: u16 = 0x3800;
/// f16 bits of 1.0.
pub const HALF_1_0: u16 = 0x3C00;

/// Core, stream, and sidecar bytes for one synthetic mesh.
#[derive(Debug, Clone)]
pub struct SampleMesh {
	/// Core file image.
	pub core: Vec<u8>,
	/// Stream file image.
	pub stream: Vec<u8>,
	/// Sidecar document, when the sample needs one.
	pub sidecar: Option<Value>,
	/// Primitive GUIDs in draw order.
	pub primitives: Vec<[u8; 16]>,
	/// Vertex count per primitive.
	pub vertex_counts: Vec<usize>,
	/// Index count per primitive.
	pub index_counts: Vec<usize>,
}

impl SampleMesh {
	/// Write `<name>.core`, its stream, and its sidecar into `dir`; return the core path.
	pub fn write_to(&self, dir: &Path, name: &str) -> std::io::Result<PathBuf> {
		let core = dir.join(format!("{name}.core"));
		fs::write(&core, &self.core)?;
		fs::write(dir.join(format!("{name}.core.stream")), &self.stream)?;
		if let Some(sidecar) = &self.sidecar {
			fs::write(dir.join(format!("{name}.chunk_tables.json")), serde_json::to_vec_pretty(sidecar)?)?;
		}
		Ok(core)
	}
}

/// Mesh GUID used by the samples.
pub const SAMPLE_MESH: u8 = 10;
/// First primitive GUID.
pub const SAMPLE_PRIMITIVE_A: u8 = 1;
/// Second primitive GUID.
pub const SAMPLE_PRIMITIVE_B: u8 = 2;
/// Shared vertex stream set (chunked) or first vertex array (legacy).
pub const SAMPLE_VERTEX: u8 = 3;
/// Shared index stream (chunked) or first index array (legacy).
pub const SAMPLE_INDEX: u8 = 4;
/// Vertex chunk table (chunked) or second vertex array (legacy).
pub const SAMPLE_VERTEX_TABLE: u8 = 5;
/// Index chunk table.
pub const SAMPLE_INDEX_TABLE: u8 = 6;

fn sample_vertices(primitive: u8, count: usize) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
	let mut positions = Vec::new();
	let mut normals = Vec::new();
	let mut colors = Vec::new();
	for vertex in 0..count {
		positions.extend(position_record([vertex as f32, f32::from(primitive), 0.0], [1.0, 0.0, 0.0, 0.0]));
		normals.extend(normal_record([0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0]));
		colors.extend(color_uv_record([255, vertex as u8, 0, 255], [HALF_0_5, HALF_1_0]));
	}
	(positions, normals, colors)
}

fn u16_indices(indices: &[u16]) -> Vec<u8> {
	indices.iter().flat_map(|index| index.to_le_bytes()).collect()
}

/// Two primitives (3 and 4 vertices) sharing one vertex stream set and one index stream.
///
/// Chunk table payloads carry an unknown revision, so tables come from the sidecar.
pub fn chunked_sample() -> SampleMesh {
	chunked(false)
}

/// Same as [`chunked_sample`] with revision 1 chunk table payloads and no sidecar.
pub fn chunked_sample_native() -> SampleMesh {
	chunked(true)
}

fn chunked(native: bool) -> SampleMesh {
	let prim_a = guid(SAMPLE_PRIMITIVE_A);
	let prim_b = guid(SAMPLE_PRIMITIVE_B);
	let vertex_table = guid(SAMPLE_VERTEX_TABLE);
	let index_table = guid(SAMPLE_INDEX_TABLE);

	let (pos_a, nrm_a, cuv_a) = sample_vertices(SAMPLE_PRIMITIVE_A, 3);
	let (pos_b, nrm_b, cuv_b) = sample_vertices(SAMPLE_PRIMITIVE_B, 4);
	let idx_a = u16_indices(&[0, 1, 2]);
	let idx_b = u16_indices(&[0, 1, 2, 0, 2, 3]);

	let mut stream = Vec::new();
	let mut vertex_rows = Vec::new();
	for (primitive, count, parts) in [(prim_a, 3, [&pos_a, &nrm_a, &cuv_a]), (prim_b, 4, [&pos_b, &nrm_b, &cuv_b])] {
		for (stream_id, part) in parts.into_iter().enumerate() {
			vertex_rows.push(ChunkRow {
				stream_id: stream_id as u32,
				element_count: count,
				offset: stream.len() as u64,
				size: part.len() as u64,
				primitive,
			});
			stream.extend_from_slice(part);
		}
	}
	let vertex_size = stream.len() as u64;

	let index_offset = stream.len() as u64;
	let mut index_rows = Vec::new();
	for (primitive, count, part) in [(prim_a, 3, &idx_a), (prim_b, 6, &idx_b)] {
		index_rows.push(ChunkRow {
			stream_id: 0,
			element_count: count,
			offset: stream.len() as u64 - index_offset,
			size: part.len() as u64,
			primitive,
		});
		stream.extend_from_slice(part);
	}
	let index_size = stream.len() as u64 - index_offset;

	let streams = [
		StreamRow {
			stride: 28,
			stream_id: 0,
			table: vertex_table,
		},
		StreamRow {
			stride: 28,
			stream_id: 1,
			table: vertex_table,
		},
		StreamRow {
			stride: 8,
			stream_id: 2,
			table: vertex_table,
		},
	];

	let (vertex_table_payload, index_table_payload, sidecar) = if native {
		(
			chunk_table_payload(0, vertex_size, &vertex_rows),
			chunk_table_payload(index_offset, index_size, &index_rows),
			None,
		)
	} else {
		let mut tables = serde_json::Map::new();
		tables.insert(guid_string(SAMPLE_VERTEX_TABLE), sidecar_table(0, vertex_size, &vertex_rows));
		tables.insert(guid_string(SAMPLE_INDEX_TABLE), sidecar_table(index_offset, index_size, &index_rows));
		(opaque_chunk_table_payload(), opaque_chunk_table_payload(), Some(json!({ "chunkTables": tables })))
	};

	let core = CoreWriter::new()
		.block(
			ids::REGULAR_SKINNED_MESH_RESOURCE,
			guid(SAMPLE_MESH),
			&mesh_payload(&[&[prim_a, prim_b]]),
		)
		.block(
			ids::RENDERING_PRIMITIVE_RESOURCE,
			prim_a,
			&primitive_payload(guid(SAMPLE_VERTEX), Some(guid(SAMPLE_INDEX))),
		)
		.block(
			ids::RENDERING_PRIMITIVE_RESOURCE,
			prim_b,
			&primitive_payload(guid(SAMPLE_VERTEX), Some(guid(SAMPLE_INDEX))),
		)
		.block(ids::VERTEX_STREAM_SET, guid(SAMPLE_VERTEX), &vertex_set_payload(7, &streams))
		.block(ids::INDEX_STREAM, guid(SAMPLE_INDEX), &index_stream_payload(9, 0, index_table))
		.block(ids::STREAM_CHUNK_TABLE, vertex_table, &vertex_table_payload)
		.block(ids::STREAM_CHUNK_TABLE, index_table, &index_table_payload)
		.block(ids::UNRECOGNIZED, guid(99), &[0; 4])
		.finish();

	SampleMesh {
		core,
		stream,
		sidecar,
		primitives: vec![prim_a, prim_b],
		vertex_counts: vec![3, 4],
		index_counts: vec![3, 6],
	}
}

/// Legacy mesh with two LODs: primitive A (3 vertices, 3 indices) then primitive B (2 vertices, no indices).
///
/// Primitive B's block comes first in the directory; the mesh resource defines draw order.
pub fn legacy_sample() -> SampleMesh {
	let prim_a = guid(SAMPLE_PRIMITIVE_A);
	let prim_b = guid(SAMPLE_PRIMITIVE_B);
	let buffer = guid(42);

	let (pos_a, nrm_a, cuv_a) = sample_vertices(SAMPLE_PRIMITIVE_A, 3);
	let (pos_b, _, _) = sample_vertices(SAMPLE_PRIMITIVE_B, 2);
	let idx_a = u16_indices(&[0, 1, 2]);

	let mut stream = Vec::new();
	let mut views_a = Vec::new();
	for (semantic, stride, part) in [(0, 28, &pos_a), (1, 28, &nrm_a), (2, 8, &cuv_a)] {
		views_a.push(ViewRow {
			semantic,
			stride,
			buffer,
			offset: stream.len() as u64,
			length: part.len() as u64,
		});
		stream.extend_from_slice(part);
	}
	let index_offset = stream.len() as u64;
	stream.extend_from_slice(&idx_a);
	let views_b = [ViewRow {
		semantic: 0,
		stride: 28,
		buffer,
		offset: stream.len() as u64,
		length: pos_b.len() as u64,
	}];
	stream.extend_from_slice(&pos_b);

	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, prim_b, &primitive_payload(guid(SAMPLE_VERTEX_TABLE), None))
		.block(
			ids::REGULAR_SKINNED_MESH_RESOURCE,
			guid(SAMPLE_MESH),
			&mesh_payload(&[&[prim_a], &[prim_b]]),
		)
		.block(
			ids::RENDERING_PRIMITIVE_RESOURCE,
			prim_a,
			&primitive_payload(guid(SAMPLE_VERTEX), Some(guid(SAMPLE_INDEX))),
		)
		.block(ids::VERTEX_ARRAY_RESOURCE, guid(SAMPLE_VERTEX), &vertex_array_payload(3, &views_a))
		.block(
			ids::INDEX_ARRAY_RESOURCE,
			guid(SAMPLE_INDEX),
			&index_array_payload(3, 0, buffer, index_offset, idx_a.len() as u64),
		)
		.block(ids::VERTEX_ARRAY_RESOURCE, guid(SAMPLE_VERTEX_TABLE), &vertex_array_payload(2, &views_b))
		.finish();

	SampleMesh {
		core,
		stream,
		sidecar: None,
		primitives: vec![prim_a, prim_b],
		vertex_counts: vec![3, 2],
		index_counts: vec![3, 0],
	}
}
