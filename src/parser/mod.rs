pub mod annotations;
pub mod header;
pub mod library;

pub use annotations::{collect, AnnotationRecord};
pub use library::{enumerate_books, BookIdentity, LibraryBook};
