use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to serialize json: {err}"),
	}
}

/// Render a byte offset as fixed-width hex.
pub(crate) fn offset_hex(offset: usize) -> String {
	format!("0x{offset:08x}")
}
