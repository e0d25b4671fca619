use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::decima::DecimaError;

/// 128-bit block identifier as embedded in `.core` payloads.
///
/// GUIDs only mean something inside the index built for the same core file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Uuid);

impl Guid {
	/// All-zero GUID.
	pub const NIL: Self = Self(Uuid::nil());

	/// Build a GUID from its on-disk mixed-endian byte order.
	pub const fn from_bytes_le(bytes: [u8; 16]) -> Self {
		Self(Uuid::from_bytes_le(bytes))
	}

	/// Return the on-disk mixed-endian byte order.
	pub fn to_bytes_le(self) -> [u8; 16] {
		self.0.to_bytes_le()
	}

	/// Return whether this is the all-zero GUID.
	pub fn is_nil(self) -> bool {
		self.0.is_nil()
	}
}

impl fmt::Display for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.hyphenated())
	}
}

impl FromStr for Guid {
	type Err = DecimaError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(value)
			.map(Self)
			.map_err(|_| DecimaError::InvalidGuid { value: value.to_owned() })
	}
}
