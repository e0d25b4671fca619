/// Block listing command.
pub mod inspect;
/// Mesh resolution command.
pub mod resolve;

pub(crate) mod util;
