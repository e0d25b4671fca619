use coremesh_testkit::{CoreWriter, guid};

use crate::decima::{BlockIter, BlockKind, DecimaError, Guid, RENDERING_PRIMITIVE_RESOURCE};

#[test]
fn parses_contiguous_records_in_order() {
	let bytes = CoreWriter::new()
		.block(RENDERING_PRIMITIVE_RESOURCE, guid(1), &[1, 2, 3])
		.block(0xDEAD_BEEF, guid(2), &[])
		.finish();

	let blocks: Vec<_> = BlockIter::new(&bytes).collect::<Result<_, _>>().expect("records parse");
	assert_eq!(blocks.len(), 2);

	assert_eq!(blocks[0].kind, BlockKind::RenderingPrimitive);
	assert_eq!(blocks[0].guid, Guid::from_bytes_le(guid(1)));
	assert_eq!(blocks[0].payload, &[1, 2, 3]);
	assert_eq!(blocks[0].file_offset, 0);
	assert_eq!(blocks[0].size, 19);
	assert_eq!(blocks[0].byte_range(), 0..31);

	assert_eq!(blocks[1].kind, BlockKind::Unknown(0xDEAD_BEEF));
	assert_eq!(blocks[1].file_offset, 31);
	assert!(blocks[1].payload.is_empty());
}

#[test]
fn declared_size_past_eof_is_malformed() {
	let mut bytes = CoreWriter::new().block(RENDERING_PRIMITIVE_RESOURCE, guid(1), &[0; 8]).finish();
	bytes.truncate(bytes.len() - 4);

	let mut iter = BlockIter::new(&bytes);
	let err = iter.next().expect("one item").expect_err("size exceeds file");
	assert!(matches!(err, DecimaError::MalformedContainer { at: 0, .. }), "got {err}");
	assert!(iter.next().is_none(), "iterator stops after an error");
}

#[test]
fn size_smaller_than_guid_is_malformed() {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(&RENDERING_PRIMITIVE_RESOURCE.to_le_bytes());
	bytes.extend_from_slice(&8_u32.to_le_bytes());
	bytes.extend_from_slice(&[0; 8]);

	let err = BlockIter::new(&bytes).next().expect("one item").expect_err("size too small");
	assert!(matches!(err, DecimaError::MalformedContainer { .. }));
}

#[test]
fn trailing_partial_prefix_is_malformed() {
	let mut bytes = CoreWriter::new().block(RENDERING_PRIMITIVE_RESOURCE, guid(1), &[]).finish();
	bytes.extend_from_slice(&[0xFF; 5]);

	let results: Vec<_> = BlockIter::new(&bytes).collect();
	assert_eq!(results.len(), 2);
	assert!(results[0].is_ok());
	assert!(matches!(results[1], Err(DecimaError::MalformedContainer { at: 28, .. })));
}
