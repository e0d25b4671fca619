use half::f16;

use crate::decima::stream::validate_stride;
use crate::decima::{DecimaError, Guid, Result, StreamFile, StreamSemantic};

/// Absolute byte range inside a stream file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
	/// Absolute start offset.
	pub offset: u64,
	/// Byte length.
	pub size: u64,
}

/// Everything needed to slice one stream out of a stream file.
#[derive(Debug, Clone, Copy)]
pub struct SliceRequest {
	/// GUID of the block declaring the stream, for error reporting.
	pub owner: Guid,
	/// Stream position inside `owner`.
	pub stream: usize,
	/// Attribute channel.
	pub semantic: StreamSemantic,
	/// Record stride in bytes.
	pub stride: u32,
	/// Bytes to read.
	pub range: ByteRange,
	/// Element count the range must hold exactly, if declared.
	pub declared_count: Option<u32>,
}

/// Independent copy of one sliced stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
	semantic: StreamSemantic,
	element_stride: u32,
	element_count: usize,
	range: ByteRange,
	raw: Vec<u8>,
}

/// Typed per-attribute arrays split out of interleaved records.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArrays {
	/// Position stream.
	Position {
		/// Vertex positions.
		positions: Vec<[f32; 3]>,
		/// Skin weights.
		weights: Vec<[f32; 4]>,
	},
	/// Normal/tangent stream.
	NormalTangent {
		/// Vertex normals.
		normals: Vec<[f32; 3]>,
		/// Vertex tangents with handedness in `w`.
		tangents: Vec<[f32; 4]>,
	},
	/// Colour/UV stream.
	ColorUv {
		/// RGBA vertex colours.
		colors: Vec<[u8; 4]>,
		/// Texture coordinates widened from f16.
		uvs: Vec<[f32; 2]>,
	},
	/// Index stream widened to u32.
	Indices(Vec<u32>),
}

impl AttributeArrays {
	/// Return the number of elements.
	pub fn len(&self) -> usize {
		match self {
			Self::Position { positions, .. } => positions.len(),
			Self::NormalTangent { normals, .. } => normals.len(),
			Self::ColorUv { colors, .. } => colors.len(),
			Self::Indices(indices) => indices.len(),
		}
	}

	/// Return whether there are no elements.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Read `request.range` from `file` and copy it out as records of `request.stride` bytes.
///
/// Nothing is produced unless the whole range is present and splits into whole records.
pub fn slice_stream(file: &StreamFile, request: &SliceRequest) -> Result<ResolvedStream> {
	validate_stride(request.owner, request.stream, request.semantic, request.stride)?;

	let bytes = file.read_range(request.range.offset, request.range.size)?;
	let stride = u64::from(request.stride);
	if request.range.size % stride != 0 {
		return Err(DecimaError::InvalidStreamLayout {
			owner: request.owner,
			stream: request.stream,
			detail: format!("range size {} is not a multiple of stride {stride}", request.range.size),
		});
	}
	let element_count = request.range.size / stride;

	if let Some(declared) = request.declared_count.filter(|declared| u64::from(*declared) != element_count) {
		return Err(DecimaError::InvalidStreamLayout {
			owner: request.owner,
			stream: request.stream,
			detail: format!("declared {declared} elements but range holds {element_count} of {stride} bytes"),
		});
	}

	tracing::trace!(
		owner = %request.owner,
		stream = request.stream,
		semantic = %request.semantic,
		offset = request.range.offset,
		size = request.range.size,
		element_count,
		"sliced stream"
	);

	Ok(ResolvedStream {
		semantic: request.semantic,
		element_stride: request.stride,
		element_count: element_count as usize,
		range: request.range,
		raw: bytes.to_vec(),
	})
}

impl ResolvedStream {
	/// Return the attribute channel.
	pub fn semantic(&self) -> StreamSemantic {
		self.semantic
	}

	/// Return the record stride in bytes.
	pub fn element_stride(&self) -> u32 {
		self.element_stride
	}

	/// Return `size / stride`.
	pub fn element_count(&self) -> usize {
		self.element_count
	}

	/// Return the source range.
	pub fn range(&self) -> ByteRange {
		self.range
	}

	/// Return the raw sliced bytes.
	pub fn raw(&self) -> &[u8] {
		&self.raw
	}

	/// Return the raw bytes for in-place edits; the length is fixed.
	pub fn raw_mut(&mut self) -> &mut [u8] {
		&mut self.raw
	}

	/// Split interleaved records into one typed array per attribute.
	pub fn attributes(&self) -> AttributeArrays {
		let records = self.raw.chunks_exact(self.element_stride as usize);
		match self.semantic {
			StreamSemantic::Position => {
				let (positions, weights) = records.map(|record| (vec3_at(record, 0), vec4_at(record, 12))).unzip();
				AttributeArrays::Position { positions, weights }
			}
			StreamSemantic::NormalTangent => {
				let (normals, tangents) = records.map(|record| (vec3_at(record, 0), vec4_at(record, 12))).unzip();
				AttributeArrays::NormalTangent { normals, tangents }
			}
			StreamSemantic::ColorUv => {
				let (colors, uvs) = records
					.map(|record| {
						let color = [record[0], record[1], record[2], record[3]];
						let uv = [half_at(record, 4), half_at(record, 6)];
						(color, uv)
					})
					.unzip();
				AttributeArrays::ColorUv { colors, uvs }
			}
			StreamSemantic::Index => {
				let indices = records
					.map(|record| match record.len() {
						2 => u32::from(u16::from_le_bytes([record[0], record[1]])),
						_ => u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
					})
					.collect();
				AttributeArrays::Indices(indices)
			}
		}
	}
}

fn f32_at(record: &[u8], at: usize) -> f32 {
	f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
}

fn vec3_at(record: &[u8], at: usize) -> [f32; 3] {
	[f32_at(record, at), f32_at(record, at + 4), f32_at(record, at + 8)]
}

fn vec4_at(record: &[u8], at: usize) -> [f32; 4] {
	[f32_at(record, at), f32_at(record, at + 4), f32_at(record, at + 8), f32_at(record, at + 12)]
}

fn half_at(record: &[u8], at: usize) -> f32 {
	f16::from_le_bytes([record[at], record[at + 1]]).to_f32()
}
