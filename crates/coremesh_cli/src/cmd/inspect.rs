use std::path::PathBuf;

use coremesh::decima::{Block, ChunkTable, CoreFile, DecodedBlock, Guid, Result, StreamDescriptor, StreamLocation};

use crate::cmd::util::{emit_json, offset_hex};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Print at most this many blocks.
	#[arg(long)]
	pub limit: Option<usize>,
	#[arg(long)]
	pub json: bool,
}

/// List block records with offsets, kinds, GUIDs, and decoded details.
pub fn run(args: Args) -> Result<()> {
	let Args { path, limit, json } = args;

	let core = CoreFile::open(&path)?;
	let directory = core.directory()?;
	let stats = core.scan_block_stats()?;
	let shown = limit.unwrap_or(usize::MAX);

	let rows: Vec<BlockJson> = directory.blocks().iter().take(shown).map(block_row).collect();

	if json {
		let mut kinds: Vec<KindCountJson> = stats
			.kinds
			.iter()
			.map(|(kind, count)| KindCountJson {
				kind: kind.to_string(),
				count: *count,
			})
			.collect();
		kinds.sort_by(|left, right| right.count.cmp(&left.count).then_with(|| left.kind.cmp(&right.kind)));

		emit_json(&InspectJson {
			path: path.display().to_string(),
			total_blocks: directory.len(),
			chunked: stats.has_vertex_stream_set(),
			kinds,
			blocks: rows,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("{:<10}  {:<34}  {:>8}  {:<36}  details", "offset", "kind", "size", "guid");
	for row in &rows {
		println!("{:<10}  {:<34}  {:>8}  {:<36}  {}", row.offset, row.kind, row.size, row.guid, row.details);
	}
	if rows.len() < directory.len() {
		println!("... {} more", directory.len() - rows.len());
	}
	println!("Total blocks: {}", directory.len());
	println!("layout: {}", if stats.has_vertex_stream_set() { "chunked" } else { "legacy" });

	Ok(())
}

fn block_row(block: &Block<'_>) -> BlockJson {
	BlockJson {
		offset: offset_hex(block.file_offset),
		type_id: format!("0x{:016X}", block.type_id),
		kind: block.kind.to_string(),
		size: block.size,
		guid: block.guid.to_string(),
		details: block_details(block),
	}
}

fn block_details(block: &Block<'_>) -> String {
	let decoded = match DecodedBlock::decode(block) {
		Ok(decoded) => decoded,
		Err(err) => return format!("decode error: {err}"),
	};

	match decoded {
		DecodedBlock::Primitive(primitive) => format!(
			"vertex={} index={}",
			ref_label(primitive.vertex_ref.local_target()),
			ref_label(primitive.index_ref.local_target())
		),
		DecodedBlock::Mesh(mesh) => {
			let counts: Vec<String> = mesh.lods.iter().map(|lod| lod.len().to_string()).collect();
			format!("lods={} primitives=[{}]", mesh.lods.len(), counts.join(", "))
		}
		DecodedBlock::VertexStreamSet(set) => {
			let streams: Vec<String> = set.streams.iter().map(stream_label).collect();
			format!("vertices={} streams=[{}]", set.vertex_count, streams.join(", "))
		}
		DecodedBlock::IndexStream(stream) => format!(
			"indices={} {}",
			stream.descriptor.element_count,
			stream_label(&stream.descriptor)
		),
		DecodedBlock::ChunkTable(_) => match ChunkTable::decode(block) {
			Ok(table) => format!(
				"entries={} buffer={}+{}",
				table.entries.len(),
				table.buffer_offset,
				table.buffer_size
			),
			Err(err) => format!("opaque ({err})"),
		},
		DecodedBlock::VertexArray(array) => {
			let streams: Vec<String> = array.streams.iter().map(stream_label).collect();
			format!("vertices={} streams=[{}]", array.vertex_count, streams.join(", "))
		}
		DecodedBlock::IndexArray(array) => format!(
			"indices={} {}",
			array.descriptor.element_count,
			stream_label(&array.descriptor)
		),
		DecodedBlock::Opaque(_) => String::new(),
	}
}

fn ref_label(target: Result<Option<Guid>>) -> String {
	match target {
		Ok(Some(guid)) => guid.to_string(),
		Ok(None) => "null".to_owned(),
		Err(err) => format!("<{err}>"),
	}
}

fn stream_label(stream: &StreamDescriptor) -> String {
	match stream.location {
		StreamLocation::Chunked(chunked) => {
			format!("{}/{} table={}#{}", stream.semantic, stream.element_stride, chunked.table, chunked.stream_id)
		}
		StreamLocation::Legacy(view) => format!("{}/{} at {}+{}", stream.semantic, stream.element_stride, view.offset, view.length),
	}
}

#[derive(serde::Serialize)]
struct BlockJson {
	offset: String,
	type_id: String,
	kind: String,
	size: u32,
	guid: String,
	details: String,
}

#[derive(serde::Serialize)]
struct KindCountJson {
	kind: String,
	count: u32,
}

#[derive(serde::Serialize)]
struct InspectJson {
	path: String,
	total_blocks: usize,
	chunked: bool,
	kinds: Vec<KindCountJson>,
	blocks: Vec<BlockJson>,
}
