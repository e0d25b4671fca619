use coremesh_testkit::{
	ChunkRow, CoreWriter, SampleMesh, StreamRow, ViewRow, chunk_table_payload, chunked_sample, chunked_sample_native, guid, ids,
	index_stream_payload, legacy_sample, primitive_payload, vertex_array_payload, vertex_set_payload,
};

use crate::decima::{
	AttributeArrays, CoreFile, DecimaError, FallbackChunkTableSource, Guid, MeshResolver, NativeChunkTableSource, PrimitiveGeometrySource,
	SidecarChunkTableSource, StreamFile, StreamSemantic, resolve_mesh,
};

fn open(sample: &SampleMesh) -> (CoreFile, StreamFile) {
	(CoreFile::from_bytes(sample.core.clone()), StreamFile::from_bytes(sample.stream.clone()))
}

fn sidecar_of(sample: &SampleMesh) -> SidecarChunkTableSource {
	let text = sample.sidecar.as_ref().expect("sample has a sidecar").to_string();
	SidecarChunkTableSource::from_json_str(&text).expect("sidecar parses")
}

#[test]
fn chunked_mesh_resolves_through_sidecar() {
	let sample = chunked_sample();
	let (core, stream) = open(&sample);
	let source = FallbackChunkTableSource::new(Some(sidecar_of(&sample)));

	let mesh = resolve_mesh(&core, &stream, &source).expect("mesh resolves");
	assert_eq!(mesh.name, "mesh");
	assert!(mesh.is_chunked());
	assert_eq!(mesh.primitives.len(), 2);

	for (idx, primitive) in mesh.primitives.iter().enumerate() {
		assert_eq!(primitive.record.primitive_index, idx);
		assert_eq!(primitive.record.guid, Guid::from_bytes_le(sample.primitives[idx]));
		assert_eq!(primitive.vertex_count, sample.vertex_counts[idx]);
		assert_eq!(primitive.streams.len(), 3);
		let indices = primitive.indices.as_ref().expect("primitive has indices");
		assert_eq!(indices.element_count(), sample.index_counts[idx]);
	}

	let second = &mesh.primitives[1];
	assert_eq!(second.streams[0].range().offset, 192);
	match second.streams[0].attributes() {
		AttributeArrays::Position { positions, .. } => assert_eq!(positions[3], [3.0, 2.0, 0.0]),
		other => panic!("unexpected attributes: {other:?}"),
	}
	match second.streams[2].attributes() {
		AttributeArrays::ColorUv { colors, uvs } => {
			assert_eq!(colors[1], [255, 1, 0, 255]);
			assert_eq!(uvs[0], [0.5, 1.0]);
		}
		other => panic!("unexpected attributes: {other:?}"),
	}
	assert_eq!(
		second.indices.as_ref().map(|indices| indices.attributes()),
		Some(AttributeArrays::Indices(vec![0, 1, 2, 0, 2, 3]))
	);
}

#[test]
fn native_tables_give_the_same_geometry() {
	let native = chunked_sample_native();
	let described = chunked_sample();
	let (native_core, native_stream) = open(&native);
	let (described_core, described_stream) = open(&described);

	let from_native = resolve_mesh(&native_core, &native_stream, &NativeChunkTableSource).expect("native resolves");
	let from_sidecar = resolve_mesh(&described_core, &described_stream, &sidecar_of(&described)).expect("sidecar resolves");

	for (left, right) in from_native.primitives.iter().zip(&from_sidecar.primitives) {
		assert_eq!(left.streams, right.streams);
		assert_eq!(left.indices, right.indices);
	}
}

#[test]
fn unsupported_revision_without_sidecar_fails_the_mesh() {
	let sample = chunked_sample();
	let (core, stream) = open(&sample);

	let err = resolve_mesh(&core, &stream, &FallbackChunkTableSource::new(None)).expect_err("no chunk tables available");
	assert!(matches!(err, DecimaError::UnsupportedVersion { context: "chunk table", .. }));
	assert!(!err.is_fatal());
}

#[test]
fn legacy_mesh_follows_mesh_resource_order() {
	let sample = legacy_sample();
	let (core, stream) = open(&sample);

	let mesh = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect("legacy mesh resolves");
	assert!(!mesh.is_chunked());

	let lods: Vec<_> = mesh.primitives.iter().map(|primitive| primitive.record.lod_level).collect();
	assert_eq!(lods, vec![0, 1]);
	assert_eq!(mesh.primitives[0].record.guid, Guid::from_bytes_le(sample.primitives[0]));
	assert!(matches!(mesh.primitives[0].source, PrimitiveGeometrySource::Legacy(_)));
	assert_eq!(mesh.primitives[0].vertex_count, 3);
	assert_eq!(mesh.primitives[1].vertex_count, 2);
	assert!(mesh.primitives[1].indices.is_none());

	for primitive in &mesh.primitives {
		for resolved in &primitive.streams {
			let count = resolved.range().size / u64::from(resolved.element_stride());
			assert_eq!(count as usize, primitive.vertex_count);
		}
	}
}

#[test]
fn primitives_without_mesh_resource_use_directory_order() {
	let table = guid(5);
	let rows: Vec<_> = [(1, 0), (2, 28)]
		.into_iter()
		.map(|(primitive, offset)| ChunkRow {
			stream_id: 0,
			element_count: 1,
			offset,
			size: 28,
			primitive: guid(primitive),
		})
		.collect();
	let streams = [StreamRow {
		stride: 28,
		stream_id: 0,
		table,
	}];
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(2), &primitive_payload(guid(3), None))
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(3), None))
		.block(ids::VERTEX_STREAM_SET, guid(3), &vertex_set_payload(2, &streams))
		.block(ids::STREAM_CHUNK_TABLE, table, &chunk_table_payload(0, 56, &rows))
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(vec![0; 56]);

	let resolver = MeshResolver::new(&core, &stream, &NativeChunkTableSource).expect("resolver opens");
	let records = resolver.primitive_records().expect("records list");
	let order: Vec<_> = records.iter().map(|record| record.guid).collect();
	assert_eq!(order, vec![Guid::from_bytes_le(guid(2)), Guid::from_bytes_le(guid(1))]);
	assert!(records.iter().all(|record| record.lod_level == 0 && record.index_guid.is_none()));

	let mesh = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect("mesh resolves");
	assert_eq!(mesh.primitives[0].streams[0].range().offset, 28);
	assert_eq!(mesh.primitives[0].streams[0].semantic(), StreamSemantic::Position);
}

#[test]
fn missing_chunk_entry_is_inconsistent() {
	let table = guid(5);
	let rows = [ChunkRow {
		stream_id: 0,
		element_count: 1,
		offset: 0,
		size: 28,
		primitive: guid(1),
	}];
	let streams = [
		StreamRow {
			stride: 28,
			stream_id: 0,
			table,
		},
		StreamRow {
			stride: 28,
			stream_id: 1,
			table,
		},
	];
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(3), None))
		.block(ids::VERTEX_STREAM_SET, guid(3), &vertex_set_payload(1, &streams))
		.block(ids::STREAM_CHUNK_TABLE, table, &chunk_table_payload(0, 56, &rows))
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(vec![0; 56]);

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("normal stream has no entry");
	assert!(matches!(err, DecimaError::ChunkTableInconsistent { .. }), "got {err}");
}

#[test]
fn disagreeing_vertex_counts_are_invalid_layout() {
	let table = guid(5);
	let rows = [
		ChunkRow {
			stream_id: 0,
			element_count: 2,
			offset: 0,
			size: 56,
			primitive: guid(1),
		},
		ChunkRow {
			stream_id: 1,
			element_count: 1,
			offset: 56,
			size: 28,
			primitive: guid(1),
		},
	];
	let streams = [
		StreamRow {
			stride: 28,
			stream_id: 0,
			table,
		},
		StreamRow {
			stride: 28,
			stream_id: 1,
			table,
		},
	];
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(3), None))
		.block(ids::VERTEX_STREAM_SET, guid(3), &vertex_set_payload(2, &streams))
		.block(ids::STREAM_CHUNK_TABLE, table, &chunk_table_payload(0, 84, &rows))
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(vec![0; 84]);

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("position has 2 vertices, normal 1");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { stream: 1, .. }), "got {err}");
}

#[test]
fn truncated_stream_fails_without_partial_output() {
	let sample = chunked_sample_native();
	let core = CoreFile::from_bytes(sample.core.clone());
	let stream = StreamFile::from_bytes(sample.stream[..300].to_vec());

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("second primitive runs past the stream");
	assert!(matches!(err, DecimaError::TruncatedBuffer { available: 300, .. }), "got {err}");
}

#[test]
fn vertex_reference_to_wrong_kind_is_reported() {
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(6), None))
		.block(ids::STREAM_CHUNK_TABLE, guid(6), &[])
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(Vec::new());

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("vertex target is a chunk table");
	assert!(matches!(err, DecimaError::UnexpectedBlockKind { .. }));
}

#[test]
fn legacy_view_longer_than_header_count_fails() {
	let views = [ViewRow {
		semantic: 0,
		stride: 28,
		buffer: guid(42),
		offset: 0,
		length: 112,
	}];
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(3), None))
		.block(ids::VERTEX_ARRAY_RESOURCE, guid(3), &vertex_array_payload(2, &views))
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(vec![0; 112]);

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("header declares 2 vertices");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { stream: 0, .. }), "got {err}");
}

#[test]
fn chunk_entry_count_must_match_its_length() {
	let table = guid(5);
	let rows = [ChunkRow {
		stream_id: 0,
		element_count: 1,
		offset: 0,
		size: 56,
		primitive: guid(1),
	}];
	let streams = [StreamRow {
		stride: 28,
		stream_id: 0,
		table,
	}];
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(3), None))
		.block(ids::VERTEX_STREAM_SET, guid(3), &vertex_set_payload(1, &streams))
		.block(ids::STREAM_CHUNK_TABLE, table, &chunk_table_payload(0, 56, &rows))
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(vec![0; 56]);

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("entry declares 1 vertex over 56 bytes");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { stream: 0, .. }), "got {err}");
}

#[test]
fn index_stream_sharing_vertex_table_is_rejected() {
	let table = guid(5);
	let rows = [ChunkRow {
		stream_id: 0,
		element_count: 1,
		offset: 0,
		size: 28,
		primitive: guid(1),
	}];
	let streams = [StreamRow {
		stride: 28,
		stream_id: 0,
		table,
	}];
	let core = CoreWriter::new()
		.block(ids::RENDERING_PRIMITIVE_RESOURCE, guid(1), &primitive_payload(guid(3), Some(guid(4))))
		.block(ids::VERTEX_STREAM_SET, guid(3), &vertex_set_payload(1, &streams))
		.block(ids::INDEX_STREAM, guid(4), &index_stream_payload(14, 0, table))
		.block(ids::STREAM_CHUNK_TABLE, table, &chunk_table_payload(0, 28, &rows))
		.finish();
	let core = CoreFile::from_bytes(core);
	let stream = StreamFile::from_bytes(vec![0; 28]);

	let err = resolve_mesh(&core, &stream, &NativeChunkTableSource).expect_err("index chunk would alias the position chunk");
	let index_guid = Guid::from_bytes_le(guid(4));
	assert!(
		matches!(err, DecimaError::InvalidStreamLayout { owner, .. } if owner == index_guid),
		"got {err}"
	);
}
