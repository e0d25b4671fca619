#![allow(missing_docs)]

use std::path::Path;
use std::process::{Command, Output};

use coremesh_testkit::{SampleMesh, chunked_sample, chunked_sample_native, legacy_sample};

fn write_sample(dir: &Path, name: &str, sample: &SampleMesh) -> String {
	let path = sample.write_to(dir, name).expect("sample files write");
	path.to_string_lossy().into_owned()
}

fn run_coremesh(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_coremesh")).args(args).output().expect("coremesh command executes")
}

fn run_coremesh_json(args: &[&str]) -> serde_json::Value {
	let output = run_coremesh(args);
	assert!(
		output.status.success(),
		"coremesh command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

#[test]
fn inspect_lists_blocks_and_total() {
	let dir = tempfile::tempdir().expect("tempdir");
	let core = write_sample(dir.path(), "body", &chunked_sample_native());

	let output = run_coremesh(&["inspect", &core]);
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("RegularSkinnedMeshResource"));
	assert!(stdout.contains("VertexStreamSet"));
	assert!(stdout.contains("0x0123456789ABCDEF"), "unknown kinds print their hash");
	assert!(stdout.contains("entries=6 buffer=0+448"));
	assert!(stdout.contains("Total blocks: 8"));
}

#[test]
fn inspect_json_respects_limit() {
	let dir = tempfile::tempdir().expect("tempdir");
	let core = write_sample(dir.path(), "body", &chunked_sample());

	let json = run_coremesh_json(&["inspect", &core, "--limit", "2", "--json"]);
	assert_eq!(json["total_blocks"], 8);
	assert_eq!(json["chunked"], true);
	let blocks = json["blocks"].as_array().expect("blocks array");
	assert_eq!(blocks.len(), 2);
	assert_eq!(blocks[0]["kind"], "RegularSkinnedMeshResource");
	assert_eq!(blocks[1]["offset"], "0x00000046");
	assert!(blocks[1]["details"].as_str().is_some_and(|details| details.starts_with("vertex=")));
}

#[test]
fn inspect_fails_on_malformed_container() {
	let dir = tempfile::tempdir().expect("tempdir");
	let core = dir.path().join("broken.core");
	let mut bytes = chunked_sample().core;
	bytes.truncate(bytes.len() - 1);
	std::fs::write(&core, bytes).expect("core writes");

	let output = run_coremesh(&["inspect", &core.to_string_lossy()]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("malformed container"));
}

#[test]
fn resolve_json_reports_primitives() {
	let dir = tempfile::tempdir().expect("tempdir");
	let core = write_sample(dir.path(), "body", &chunked_sample());

	let json = run_coremesh_json(&["resolve", &core, "--json"]);
	assert_eq!(json["failed"], 0);
	let mesh = &json["meshes"][0]["mesh"];
	assert_eq!(mesh["name"], "body");
	assert_eq!(mesh["chunked"], true);
	assert_eq!(mesh["primitives"][1]["vertex_count"], 4);
	assert_eq!(mesh["primitives"][1]["index_count"], 6);
	assert_eq!(mesh["primitives"][1]["streams"][0]["offset"], 192);
	assert_eq!(mesh["primitives"][0]["indices"]["offset"], 448);
}

#[test]
fn resolve_continues_after_a_failing_mesh() {
	let dir = tempfile::tempdir().expect("tempdir");
	let good = write_sample(dir.path(), "good", &legacy_sample());
	let missing = dir.path().join("missing.core").to_string_lossy().into_owned();

	let output = run_coremesh(&["resolve", &missing, &good, "--json", "--no-mmap"]);
	assert_eq!(output.status.code(), Some(1));
	let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be valid json");
	assert_eq!(json["failed"], 1);
	assert_eq!(json["meshes"][0]["ok"], false);
	assert_eq!(json["meshes"][1]["ok"], true);
	assert_eq!(json["meshes"][1]["mesh"]["primitives"][1]["lod"], 1);
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("missing.core"), "failure is logged with its path: {stderr}");
}

#[test]
fn resolve_native_source_rejects_sidecar_only_tables() {
	let dir = tempfile::tempdir().expect("tempdir");
	let core = write_sample(dir.path(), "body", &chunked_sample());

	let output = run_coremesh(&["resolve", &core, "--source", "native"]);
	assert_eq!(output.status.code(), Some(1));
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("unsupported chunk table revision"), "got {stdout}");
	assert!(stdout.contains("meshes: 0 resolved, 1 failed"));
}
