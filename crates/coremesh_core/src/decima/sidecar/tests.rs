use coremesh_testkit::{
	SAMPLE_INDEX_TABLE, SAMPLE_PRIMITIVE_A, SAMPLE_PRIMITIVE_B, SAMPLE_VERTEX, SAMPLE_VERTEX_TABLE, chunked_sample, chunked_sample_native, guid,
	guid_string,
};
use serde_json::{Value, json};

use crate::decima::{
	BlockDirectory, ChunkTableSource, CoreFile, DecimaError, FallbackChunkTableSource, Guid, GuidIndex, NativeChunkTableSource,
	SidecarChunkTableSource, StreamFile, resolve_mesh,
};

fn chunk(primitive: u8, offset: u64, length: u64, vertex_count: u32) -> Value {
	json!({ "primitiveGuid": guid_string(primitive), "offset": offset, "length": length, "vertexCount": vertex_count })
}

/// Vertex set layout of the chunked sample, keyed by stream role.
fn sample_vertex_sets(position_stride: u32) -> Value {
	let a = SAMPLE_PRIMITIVE_A;
	let b = SAMPLE_PRIMITIVE_B;
	json!({
		guid_string(SAMPLE_VERTEX): {
			"vertexCount": 7,
			"streams": {
				"position": { "stride": position_stride, "chunks": [chunk(a, 0, 84, 3), chunk(b, 192, 112, 4)] },
				"normal_tangent": { "stride": 28, "chunks": [chunk(a, 84, 84, 3), chunk(b, 304, 112, 4)] },
				"2": { "stride": 8, "chunks": [chunk(a, 168, 24, 3), chunk(b, 416, 32, 4)] },
			},
		},
	})
}

fn index_tables() -> Value {
	let sample = chunked_sample();
	let sidecar = sample.sidecar.expect("sample has a sidecar");
	let key = guid_string(SAMPLE_INDEX_TABLE);
	json!({ key.clone(): sidecar["chunkTables"][key].clone() })
}

#[test]
fn vertex_set_layout_resolves_like_native_tables() {
	let document = json!({ "vertexSets": sample_vertex_sets(28), "chunkTables": index_tables() });
	let sidecar = SidecarChunkTableSource::from_json_str(&document.to_string()).expect("sidecar parses");
	assert_eq!(sidecar.vertex_set_count(), 1);
	assert_eq!(sidecar.len(), 1);

	let described = chunked_sample();
	let native = chunked_sample_native();
	let described_core = CoreFile::from_bytes(described.core.clone());
	let described_stream = StreamFile::from_bytes(described.stream.clone());
	let native_core = CoreFile::from_bytes(native.core.clone());
	let native_stream = StreamFile::from_bytes(native.stream.clone());

	let from_sidecar =
		resolve_mesh(&described_core, &described_stream, &FallbackChunkTableSource::new(Some(sidecar))).expect("sidecar resolves");
	let from_native = resolve_mesh(&native_core, &native_stream, &NativeChunkTableSource).expect("native resolves");

	assert_eq!(from_sidecar.primitives.len(), 2);
	for (left, right) in from_sidecar.primitives.iter().zip(&from_native.primitives) {
		assert_eq!(left.vertex_count, right.vertex_count);
		assert_eq!(left.streams, right.streams);
		assert_eq!(left.indices, right.indices);
	}
}

#[test]
fn rebuilt_table_maps_roles_to_stream_ids() {
	let sample = chunked_sample();
	let index = GuidIndex::build(BlockDirectory::read(&sample.core).expect("directory reads")).expect("index builds");
	let document = json!({ "vertexSets": sample_vertex_sets(28) });
	let sidecar = SidecarChunkTableSource::from_json_str(&document.to_string()).expect("sidecar parses");

	let table = sidecar
		.load(&index, Guid::from_bytes_le(guid(SAMPLE_VERTEX_TABLE)))
		.expect("table rebuilt from the vertex set");
	assert_eq!(table.buffer_offset, 0);
	assert_eq!(table.buffer_size, 448);
	assert_eq!(table.entries.len(), 6);

	let (_, colors_b) = table
		.entry_for(2, Guid::from_bytes_le(guid(SAMPLE_PRIMITIVE_B)))
		.expect("colour entry of primitive B");
	assert_eq!((colors_b.byte_offset, colors_b.byte_size, colors_b.element_count), (416, 32, Some(4)));

	let err = sidecar
		.load(&index, Guid::from_bytes_le(guid(SAMPLE_INDEX_TABLE)))
		.expect_err("no vertex set points at the index table");
	assert!(matches!(err, DecimaError::DanglingReference { .. }), "got {err}");
}

#[test]
fn stride_disagreeing_with_descriptor_is_invalid_layout() {
	let sample = chunked_sample();
	let index = GuidIndex::build(BlockDirectory::read(&sample.core).expect("directory reads")).expect("index builds");
	let document = json!({ "vertexSets": sample_vertex_sets(32) });
	let sidecar = SidecarChunkTableSource::from_json_str(&document.to_string()).expect("sidecar parses");

	let err = sidecar
		.load(&index, Guid::from_bytes_le(guid(SAMPLE_VERTEX_TABLE)))
		.expect_err("position stride is 28");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { stream: 0, .. }), "got {err}");
}

#[test]
fn document_without_tables_or_vertex_sets_is_rejected() {
	for text in [r#"{}"#, r#"{ "meshes": {} }"#] {
		let err = SidecarChunkTableSource::from_json_str(text).expect_err("nothing to read");
		assert!(matches!(err, DecimaError::Sidecar { .. }), "got {err}");
	}
}

#[test]
fn unknown_stream_role_is_rejected() {
	let document = json!({ "vertexSets": { guid_string(SAMPLE_VERTEX): { "streams": { "tangent_space": { "chunks": [] } } } } });
	let err = SidecarChunkTableSource::from_json_str(&document.to_string()).expect_err("role has no semantic");
	assert!(matches!(err, DecimaError::Sidecar { .. }), "got {err}");
}
