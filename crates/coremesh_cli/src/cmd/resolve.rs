use std::path::PathBuf;
use std::process::ExitCode;

use coremesh::decima::{
	ChunkTableMode, PrimitiveGeometrySource, ResolveOptions, ResolvedMesh, ResolvedPrimitive, ResolvedStream, Result, resolve_batch,
};

use crate::cmd::util::emit_json;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SourceArg {
	/// Decode chunk table blocks only.
	Native,
	/// Read chunk tables from the sidecar only.
	Sidecar,
	/// Decode natively and fall back to the sidecar.
	Auto,
}

impl From<SourceArg> for ChunkTableMode {
	fn from(value: SourceArg) -> Self {
		match value {
			SourceArg::Native => Self::Native,
			SourceArg::Sidecar => Self::Sidecar,
			SourceArg::Auto => Self::NativeThenSidecar,
		}
	}
}

#[derive(clap::Args)]
pub struct Args {
	#[arg(required = true)]
	pub paths: Vec<PathBuf>,
	/// Stream file for every mesh; defaults to `<core>.stream`.
	#[arg(long)]
	pub stream: Option<PathBuf>,
	/// Chunk table sidecar for every mesh; defaults to `<core stem>.chunk_tables.json`.
	#[arg(long)]
	pub sidecar: Option<PathBuf>,
	#[arg(long, value_enum, default_value = "auto")]
	pub source: SourceArg,
	/// Read stream files into memory instead of mapping them.
	#[arg(long = "no-mmap")]
	pub no_mmap: bool,
	#[arg(long)]
	pub json: bool,
}

/// Resolve each mesh and print its primitives; exit non-zero when any mesh failed.
pub fn run(args: Args) -> Result<ExitCode> {
	let Args {
		paths,
		stream,
		sidecar,
		source,
		no_mmap,
		json,
	} = args;

	let options = ResolveOptions {
		stream_path: stream,
		sidecar_path: sidecar,
		chunk_tables: source.into(),
		use_mmap: !no_mmap,
	};

	let outcomes = resolve_batch(&paths, &options);
	let mut failed = 0;
	for outcome in &outcomes {
		if let Err(err) = &outcome.result {
			tracing::error!(path = %outcome.path.display(), "{err}");
			failed += 1;
		}
	}

	if json {
		let meshes = outcomes
			.iter()
			.map(|outcome| {
				let (mesh, error) = match &outcome.result {
					Ok(mesh) => (Some(mesh_json(mesh)), None),
					Err(err) => (None, Some(err.to_string())),
				};
				MeshOutcomeJson {
					path: outcome.path.display().to_string(),
					ok: error.is_none(),
					error,
					mesh,
				}
			})
			.collect();
		emit_json(&ResolveJson { failed, meshes });
	} else {
		for outcome in &outcomes {
			println!("path: {}", outcome.path.display());
			match &outcome.result {
				Ok(mesh) => print_mesh(mesh),
				Err(err) => println!("failed: {err}"),
			}
		}
		println!("meshes: {} resolved, {failed} failed", outcomes.len() - failed);
	}

	Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_mesh(mesh: &ResolvedMesh) {
	println!("mesh: {}", mesh.name);
	println!("layout: {}", if mesh.is_chunked() { "chunked" } else { "legacy" });
	for primitive in &mesh.primitives {
		println!(
			"primitive {}: guid={} lod={} vertices={} indices={}",
			primitive.record.primitive_index,
			primitive.record.guid,
			primitive.record.lod_level,
			primitive.vertex_count,
			index_count(primitive)
		);
		for stream in primitive.streams.iter().chain(primitive.indices.as_ref()) {
			println!(
				"  {}: offset={} size={} stride={} count={}",
				stream.semantic(),
				stream.range().offset,
				stream.range().size,
				stream.element_stride(),
				stream.element_count()
			);
		}
	}
}

fn index_count(primitive: &ResolvedPrimitive) -> usize {
	primitive.indices.as_ref().map(ResolvedStream::element_count).unwrap_or(0)
}

fn source_label(source: PrimitiveGeometrySource) -> &'static str {
	match source {
		PrimitiveGeometrySource::Chunked(_) => "chunked",
		PrimitiveGeometrySource::Legacy(_) => "legacy",
	}
}

fn stream_json(stream: &ResolvedStream) -> StreamJson {
	StreamJson {
		semantic: stream.semantic().as_str(),
		offset: stream.range().offset,
		size: stream.range().size,
		stride: stream.element_stride(),
		count: stream.element_count(),
	}
}

fn mesh_json(mesh: &ResolvedMesh) -> MeshJson {
	MeshJson {
		name: mesh.name.clone(),
		chunked: mesh.is_chunked(),
		primitives: mesh
			.primitives
			.iter()
			.map(|primitive| PrimitiveJson {
				index: primitive.record.primitive_index,
				guid: primitive.record.guid.to_string(),
				lod: primitive.record.lod_level,
				source: source_label(primitive.source),
				vertex_count: primitive.vertex_count,
				index_count: index_count(primitive),
				streams: primitive.streams.iter().map(stream_json).collect(),
				indices: primitive.indices.as_ref().map(stream_json),
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct StreamJson {
	semantic: &'static str,
	offset: u64,
	size: u64,
	stride: u32,
	count: usize,
}

#[derive(serde::Serialize)]
struct PrimitiveJson {
	index: usize,
	guid: String,
	lod: u32,
	source: &'static str,
	vertex_count: usize,
	index_count: usize,
	streams: Vec<StreamJson>,
	indices: Option<StreamJson>,
}

#[derive(serde::Serialize)]
struct MeshJson {
	name: String,
	chunked: bool,
	primitives: Vec<PrimitiveJson>,
}

#[derive(serde::Serialize)]
struct MeshOutcomeJson {
	path: String,
	ok: bool,
	error: Option<String>,
	mesh: Option<MeshJson>,
}

#[derive(serde::Serialize)]
struct ResolveJson {
	failed: usize,
	meshes: Vec<MeshOutcomeJson>,
}
