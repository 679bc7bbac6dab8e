pub mod notes_file;

pub use notes_file::{load_notes, notes_path, save_notes, NoteStoreError};
