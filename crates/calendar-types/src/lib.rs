/// Calendar domain types shared by the store layer and the setup tool.
///
/// Nothing in here performs I/O. Rows coming back from the hosted store
/// deserialize into [`Event`]; rows going out are built as [`NewEvent`].
pub mod kinds;
pub mod models;

pub use kinds::{Category, Recurrence, UnknownVariant};
pub use models::{Event, EventValidationError, NewEvent};
