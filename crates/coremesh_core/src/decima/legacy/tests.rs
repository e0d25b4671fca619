use coremesh_testkit::{CoreWriter, ViewRow, guid, ids, index_array_payload, legacy_sample, vertex_array_payload};

use crate::decima::{BlockDirectory, BlockKind, DecimaError, IndexArray, StreamLocation, StreamSemantic, VertexArray};

fn view(semantic: u32, stride: u32, offset: u64, length: u64) -> ViewRow {
	ViewRow {
		semantic,
		stride,
		buffer: guid(42),
		offset,
		length,
	}
}

#[test]
fn view_size_over_stride_matches_header_count() {
	let sample = legacy_sample();
	let directory = BlockDirectory::read(&sample.core).expect("directory reads");

	let arrays: Vec<_> = directory
		.of_kind(BlockKind::VertexArray)
		.map(|(_, block)| VertexArray::parse(block).expect("vertex array decodes"))
		.collect();
	assert_eq!(arrays.len(), 2);

	for array in &arrays {
		for stream in &array.streams {
			let StreamLocation::Legacy(view) = stream.location else {
				panic!("legacy arrays carry buffer views");
			};
			assert_eq!(view.length / u64::from(view.stride), u64::from(array.vertex_count));
			assert_eq!(stream.element_count, array.vertex_count);
		}
	}
	assert_eq!(arrays[0].streams[2].semantic, StreamSemantic::ColorUv);
}

#[test]
fn index_array_decodes_view() {
	let bytes = CoreWriter::new()
		.block(ids::INDEX_ARRAY_RESOURCE, guid(4), &index_array_payload(3, 1, guid(42), 192, 12))
		.finish();
	let directory = BlockDirectory::read(&bytes).expect("directory reads");

	let array = IndexArray::parse(&directory.blocks()[0]).expect("index array decodes");
	assert_eq!(array.descriptor.element_stride, 4);
	assert_eq!(array.descriptor.element_count, 3);
	let StreamLocation::Legacy(view) = array.descriptor.location else {
		panic!("index array carries a buffer view");
	};
	assert_eq!((view.offset, view.length, view.stride), (192, 12, 4));
}

#[test]
fn view_shorter_than_declared_count_is_invalid_layout() {
	let bytes = CoreWriter::new()
		.block(ids::VERTEX_ARRAY_RESOURCE, guid(3), &vertex_array_payload(4, &[view(0, 28, 0, 84)]))
		.finish();
	let directory = BlockDirectory::read(&bytes).expect("directory reads");

	let err = VertexArray::parse(&directory.blocks()[0]).expect_err("4 vertices need 112 bytes");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { stream: 0, .. }), "got {err}");
}

#[test]
fn view_longer_than_declared_count_is_invalid_layout() {
	let bytes = CoreWriter::new()
		.block(ids::VERTEX_ARRAY_RESOURCE, guid(3), &vertex_array_payload(2, &[view(0, 28, 0, 112)]))
		.finish();
	let directory = BlockDirectory::read(&bytes).expect("directory reads");

	let err = VertexArray::parse(&directory.blocks()[0]).expect_err("112 bytes hold 4 vertices, header says 2");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { stream: 0, .. }), "got {err}");
}

#[test]
fn index_view_must_match_index_count() {
	let bytes = CoreWriter::new()
		.block(ids::INDEX_ARRAY_RESOURCE, guid(4), &index_array_payload(3, 0, guid(42), 0, 8))
		.finish();
	let directory = BlockDirectory::read(&bytes).expect("directory reads");

	let err = IndexArray::parse(&directory.blocks()[0]).expect_err("3 u16 indices take 6 bytes");
	assert!(matches!(err, DecimaError::InvalidStreamLayout { .. }), "got {err}");
}

#[test]
fn unknown_tag_and_bad_stride_are_invalid_layout() {
	for row in [view(9, 28, 0, 84), view(2, 28, 0, 84)] {
		let bytes = CoreWriter::new()
			.block(ids::VERTEX_ARRAY_RESOURCE, guid(3), &vertex_array_payload(3, &[row]))
			.finish();
		let directory = BlockDirectory::read(&bytes).expect("directory reads");

		let err = VertexArray::parse(&directory.blocks()[0]).expect_err("stream is rejected");
		assert!(matches!(err, DecimaError::InvalidStreamLayout { .. }), "got {err}");
	}
}
