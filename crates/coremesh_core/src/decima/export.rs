use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::decima::{DecimaError, Guid, PrimitiveGeometrySource, ResolvedMesh, ResolvedStream, Result};

/// Host-side object bound to one primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveBinding {
	/// Primitive position in draw order.
	pub primitive_index: usize,
	/// Owning mesh name.
	pub mesh_name: String,
}

impl PrimitiveBinding {
	/// Return the object name, `"{primitive_index}_{mesh_name}"`.
	pub fn object_name(&self) -> String {
		format!("{}_{}", self.primitive_index, self.mesh_name)
	}
}

/// Summary of a successful legacy export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
	/// Primitives written.
	pub primitives: usize,
	/// Streams written, index streams included.
	pub streams: usize,
	/// Bytes written.
	pub bytes: u64,
}

/// List primitives of `mesh` that read from the vertex stream set `vertex_set`.
pub fn primitives_sharing_vertex_set(mesh: &ResolvedMesh, vertex_set: Guid) -> Vec<PrimitiveBinding> {
	mesh.primitives
		.iter()
		.filter(|primitive| matches!(primitive.source, PrimitiveGeometrySource::Chunked(chunked) if chunked.vertex_set == vertex_set))
		.map(|primitive| PrimitiveBinding {
			primitive_index: primitive.record.primitive_index,
			mesh_name: mesh.name.clone(),
		})
		.collect()
}

/// Write every stream of `mesh` back into the existing stream file at `dest`.
///
/// Chunked meshes fail with `ChunkedExportUnsupported` before `dest` is opened.
/// Legacy streams are written at their original offsets, after all of them are checked to fit.
pub fn export_mesh(mesh: &ResolvedMesh, dest: &Path) -> Result<ExportSummary> {
	let chunked = mesh.primitives.iter().find_map(|primitive| match primitive.source {
		PrimitiveGeometrySource::Chunked(chunked) => Some(chunked.vertex_set),
		PrimitiveGeometrySource::Legacy(_) => None,
	});
	if let Some(vertex_set) = chunked {
		let objects = primitives_sharing_vertex_set(mesh, vertex_set).iter().map(PrimitiveBinding::object_name).collect();
		return Err(DecimaError::ChunkedExportUnsupported {
			mesh: mesh.name.clone(),
			objects,
		});
	}

	let streams: Vec<&ResolvedStream> = mesh
		.primitives
		.iter()
		.flat_map(|primitive| primitive.streams.iter().chain(primitive.indices.as_ref()))
		.collect();

	let mut file = OpenOptions::new().write(true).open(dest)?;
	let available = file.metadata()?.len();
	for stream in &streams {
		let range = stream.range();
		match range.offset.checked_add(range.size) {
			Some(end) if end <= available && stream.raw().len() as u64 == range.size => {}
			_ => {
				return Err(DecimaError::TruncatedBuffer {
					offset: range.offset,
					size: range.size,
					available,
				});
			}
		}
	}

	let mut bytes = 0;
	for stream in &streams {
		file.seek(SeekFrom::Start(stream.range().offset))?;
		file.write_all(stream.raw())?;
		bytes += stream.raw().len() as u64;
	}
	file.flush()?;

	tracing::info!(mesh = %mesh.name, streams = streams.len(), bytes, dest = %dest.display(), "exported legacy mesh");
	Ok(ExportSummary {
		primitives: mesh.primitives.len(),
		streams: streams.len(),
		bytes,
	})
}
