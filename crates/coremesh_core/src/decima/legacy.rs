use crate::decima::bytes::Cursor;
use crate::decima::stream::{index_stride, validate_stride};
use crate::decima::{Block, DecimaError, Guid, LegacyBufferView, Result, StreamDescriptor, StreamLocation, StreamSemantic};

/// Decoded legacy `VertexArrayResource`: buffer views owned by one primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexArray {
	/// The array's own GUID.
	pub guid: Guid,
	/// Vertex count stored in the header.
	pub vertex_count: u32,
	/// One descriptor per stream, in declaration order.
	pub streams: Vec<StreamDescriptor>,
}

impl VertexArray {
	/// Decode a legacy vertex array block.
	pub fn parse(block: &Block<'_>) -> Result<Self> {
		let owner = block.guid;
		let mut cursor = Cursor::new(block.payload);
		let vertex_count = cursor.read_u32()?;
		let stream_count = cursor.read_u32()? as usize;

		let mut streams = Vec::with_capacity(stream_count.min(8));
		for position in 0..stream_count {
			let tag = cursor.read_u32()?;
			let stride = cursor.read_u32()?;
			let view = read_view(&mut cursor, stride)?;

			let semantic = StreamSemantic::from_legacy_tag(tag).ok_or_else(|| DecimaError::InvalidStreamLayout {
				owner,
				stream: position,
				detail: format!("unknown legacy semantic tag {tag}"),
			})?;
			validate_stride(owner, position, semantic, stride)?;
			check_view_length(owner, position, &view, vertex_count)?;

			streams.push(StreamDescriptor {
				semantic,
				element_stride: stride,
				element_count: vertex_count,
				location: StreamLocation::Legacy(view),
			});
		}

		Ok(Self {
			guid: owner,
			vertex_count,
			streams,
		})
	}
}

/// Decoded legacy `IndexArrayResource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexArray {
	/// The array's own GUID.
	pub guid: Guid,
	/// Index descriptor with its buffer view.
	pub descriptor: StreamDescriptor,
}

impl IndexArray {
	/// Decode a legacy index array block.
	pub fn parse(block: &Block<'_>) -> Result<Self> {
		let owner = block.guid;
		let mut cursor = Cursor::new(block.payload);
		let index_count = cursor.read_u32()?;
		let format = cursor.read_u32()?;
		let stride = index_stride(owner, format)?;
		let view = read_view(&mut cursor, stride)?;
		check_view_length(owner, 0, &view, index_count)?;

		Ok(Self {
			guid: owner,
			descriptor: StreamDescriptor {
				semantic: StreamSemantic::Index,
				element_stride: stride,
				element_count: index_count,
				location: StreamLocation::Legacy(view),
			},
		})
	}
}

fn read_view(cursor: &mut Cursor<'_>, stride: u32) -> Result<LegacyBufferView> {
	let buffer_guid = cursor.read_guid()?;
	let offset = cursor.read_u64()?;
	let length = cursor.read_u64()?;
	Ok(LegacyBufferView {
		buffer_guid,
		offset,
		length,
		stride,
	})
}

fn check_view_length(owner: Guid, stream: usize, view: &LegacyBufferView, count: u32) -> Result<()> {
	let expected = u64::from(count) * u64::from(view.stride);
	if expected != view.length {
		return Err(DecimaError::InvalidStreamLayout {
			owner,
			stream,
			detail: format!(
				"{count} elements of {} bytes need {expected} bytes, view length is {}",
				view.stride, view.length
			),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests;
