use crate::decima::bytes::Cursor;
use crate::decima::stream::{index_stride, validate_stride};
use crate::decima::{Block, ChunkedRef, DecimaError, Guid, Result, StreamDescriptor, StreamLocation, StreamSemantic};

/// Stream id used by index chunks inside their chunk table.
///
/// Index chunks live in a table of their own; a table shared with vertex streams is rejected at resolution.
pub const INDEX_CHUNK_STREAM_ID: u32 = 0;

/// Decoded `VertexStreamSet` block: vertex streams shared by several primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexStreamSet {
	/// The set's own GUID.
	pub guid: Guid,
	/// Vertex count across every primitive sharing the set.
	pub vertex_count: u32,
	/// Header flag word.
	pub flags: u32,
	/// Format word carried in front of the first descriptor.
	pub set_format: u32,
	/// One descriptor per stream, in declaration order.
	pub streams: Vec<StreamDescriptor>,
	/// Bytes after the last descriptor.
	pub trailing: Vec<u8>,
}

impl VertexStreamSet {
	/// Decode a vertex stream set block and validate each stream's stride.
	pub fn parse(block: &Block<'_>) -> Result<Self> {
		let owner = block.guid;
		let mut cursor = Cursor::new(block.payload);
		let vertex_count = cursor.read_u32()?;
		let stream_count = cursor.read_u32()? as usize;
		let flags = cursor.read_u32()?;
		cursor.skip(4)?;

		if stream_count == 0 || StreamSemantic::for_vertex_stream(stream_count - 1).is_none() {
			return Err(DecimaError::InvalidStreamLayout {
				owner,
				stream: stream_count,
				detail: format!("unsupported stream count {stream_count}"),
			});
		}

		let mut set_format = 0;
		let mut streams = Vec::with_capacity(stream_count);
		for position in 0..stream_count {
			if position == 0 {
				set_format = cursor.read_u32()?;
				cursor.skip(4)?;
			}

			let _stream_flags = cursor.read_u32()?;
			let element_stride = cursor.read_u32()?;
			let stream_id = cursor.read_u32()?;
			cursor.skip(4)?;
			let table = cursor.read_guid()?;

			if position == 0 {
				cursor.skip(8)?;
			}

			let semantic = StreamSemantic::for_vertex_stream(position).ok_or_else(|| DecimaError::InvalidStreamLayout {
				owner,
				stream: position,
				detail: "stream has no known semantic".to_owned(),
			})?;
			validate_stride(owner, position, semantic, element_stride)?;

			tracing::debug!(%owner, position, %semantic, element_stride, stream_id, %table, "decoded vertex stream");
			streams.push(StreamDescriptor {
				semantic,
				element_stride,
				element_count: vertex_count,
				location: StreamLocation::Chunked(ChunkedRef { table, stream_id }),
			});
		}

		Ok(Self {
			guid: owner,
			vertex_count,
			flags,
			set_format,
			streams,
			trailing: cursor.rest().to_vec(),
		})
	}

	/// Return the distinct chunk tables referenced by the streams, in first-use order.
	pub fn chunk_tables(&self) -> Vec<Guid> {
		let mut tables = Vec::new();
		for stream in &self.streams {
			let StreamLocation::Chunked(chunked) = stream.location else {
				continue;
			};
			if !tables.contains(&chunked.table) {
				tables.push(chunked.table);
			}
		}
		tables
	}
}

/// Decoded chunked `IndexStream` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStream {
	/// The stream's own GUID.
	pub guid: Guid,
	/// Header flag word.
	pub flags: u32,
	/// Index descriptor pointing into a chunk table.
	pub descriptor: StreamDescriptor,
}

impl IndexStream {
	/// Decode an index stream block.
	pub fn parse(block: &Block<'_>) -> Result<Self> {
		let owner = block.guid;
		let mut cursor = Cursor::new(block.payload);
		let index_count = cursor.read_u32()?;
		let flags = cursor.read_u32()?;
		let format = cursor.read_u32()?;
		cursor.skip(4)?;
		let table = cursor.read_guid()?;

		let element_stride = index_stride(owner, format)?;

		Ok(Self {
			guid: owner,
			flags,
			descriptor: StreamDescriptor {
				semantic: StreamSemantic::Index,
				element_stride,
				element_count: index_count,
				location: StreamLocation::Chunked(ChunkedRef {
					table,
					stream_id: INDEX_CHUNK_STREAM_ID,
				}),
			},
		})
	}
}
