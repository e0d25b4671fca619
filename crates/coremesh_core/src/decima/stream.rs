use std::fmt;

use crate::decima::{DecimaError, Guid, Result};

/// Attribute channel carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamSemantic {
	/// Interleaved position (3×f32) and skin weights (4×f32).
	Position,
	/// Interleaved normal (3×f32) and tangent (4×f32).
	NormalTangent,
	/// Interleaved colour (4×u8) and texture coordinates (2×f16).
	ColorUv,
	/// Triangle indices (u16 or u32).
	Index,
}

impl StreamSemantic {
	/// Return the semantic of the vertex stream at `position` inside a stream set.
	pub fn for_vertex_stream(position: usize) -> Option<Self> {
		match position {
			0 => Some(Self::Position),
			1 => Some(Self::NormalTangent),
			2 => Some(Self::ColorUv),
			_ => None,
		}
	}

	/// Map a legacy semantic tag.
	pub fn from_legacy_tag(tag: u32) -> Option<Self> {
		match tag {
			0 => Some(Self::Position),
			1 => Some(Self::NormalTangent),
			2 => Some(Self::ColorUv),
			_ => None,
		}
	}

	/// Return the strides this semantic's record layout accepts.
	pub fn expected_strides(self) -> &'static [u32] {
		match self {
			Self::Position | Self::NormalTangent => &[28],
			Self::ColorUv => &[8],
			Self::Index => &[2, 4],
		}
	}

	/// Return a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Position => "position",
			Self::NormalTangent => "normal_tangent",
			Self::ColorUv => "color_uv",
			Self::Index => "index",
		}
	}
}

impl fmt::Display for StreamSemantic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Stream located through a chunk table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedRef {
	/// GUID of the owning chunk table block.
	pub table: Guid,
	/// Stream id matched against chunk table entries.
	pub stream_id: u32,
}

/// Stream located directly by a per-primitive buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyBufferView {
	/// GUID naming the backing buffer.
	pub buffer_guid: Guid,
	/// Absolute byte offset in the stream file.
	pub offset: u64,
	/// Byte length of the view.
	pub length: u64,
	/// Record stride in bytes.
	pub stride: u32,
}

/// Where a stream's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLocation {
	/// Shared buffer partitioned by a chunk table.
	Chunked(ChunkedRef),
	/// Buffer view owned by one primitive.
	Legacy(LegacyBufferView),
}

/// Decoded description of one vertex or index stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
	/// Attribute channel.
	pub semantic: StreamSemantic,
	/// Record stride in bytes.
	pub element_stride: u32,
	/// Element count declared by the owning header.
	pub element_count: u32,
	/// Byte source.
	pub location: StreamLocation,
}

/// Check `stride` against the record layout of `semantic`.
pub fn validate_stride(owner: Guid, stream: usize, semantic: StreamSemantic, stride: u32) -> Result<()> {
	let expected = semantic.expected_strides();
	if stride == 0 || !expected.contains(&stride) {
		return Err(DecimaError::InvalidStreamLayout {
			owner,
			stream,
			detail: format!("{semantic} stride {stride}, expected one of {expected:?}"),
		});
	}
	Ok(())
}

/// Map an index format word to its stride.
pub fn index_stride(owner: Guid, format: u32) -> Result<u32> {
	match format {
		0 => Ok(2),
		1 => Ok(4),
		other => Err(DecimaError::InvalidStreamLayout {
			owner,
			stream: 0,
			detail: format!("unknown index format {other}"),
		}),
	}
}
