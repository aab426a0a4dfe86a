pub mod field;
pub mod keyword;
pub mod media;
pub mod note;

pub use note::{Note, NoteId};
