use crate::decima::bytes::Cursor;
use crate::decima::{DecimaError, Guid, Result};

/// Encoding kind of an embedded reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
	/// No target.
	Null,
	/// Target block lives in the same core file.
	Internal,
	/// Target block lives in another core file.
	External,
	/// Target is streamed on demand from another file.
	Streaming,
}

impl RefKind {
	fn from_tag(tag: u8) -> Option<Self> {
		match tag {
			0 => Some(Self::Null),
			1 => Some(Self::Internal),
			2 => Some(Self::External),
			3 => Some(Self::Streaming),
			_ => None,
		}
	}

	/// Return the on-disk tag byte.
	pub fn tag(self) -> u8 {
		match self {
			Self::Null => 0,
			Self::Internal => 1,
			Self::External => 2,
			Self::Streaming => 3,
		}
	}
}

/// One `kind + GUID` reference read from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
	/// Reference encoding.
	pub kind: RefKind,
	/// Target GUID (nil for null references).
	pub guid: Guid,
}

impl Reference {
	/// Read a reference at the cursor.
	pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
		let tag = cursor.read_u8()?;
		let kind = RefKind::from_tag(tag).ok_or(DecimaError::UnsupportedVersion {
			context: "reference kind",
			tag: u64::from(tag),
		})?;
		let guid = cursor.read_guid()?;
		Ok(Self { kind, guid })
	}

	/// Return the same-file target, `None` for null references.
	///
	/// Cross-file references are rejected because their GUIDs mean nothing in this file's index.
	pub fn local_target(&self) -> Result<Option<Guid>> {
		match self.kind {
			RefKind::Null => Ok(None),
			RefKind::Internal => Ok(Some(self.guid)),
			RefKind::External | RefKind::Streaming => Err(DecimaError::UnsupportedVersion {
				context: "reference kind",
				tag: u64::from(self.kind.tag()),
			}),
		}
	}
}
