pub mod note;

pub use note::{lookup_by_id, Note, NoteLookup, ThreadNote};
