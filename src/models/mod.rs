pub mod entry;

pub use entry::{CreatedAt, Entry, NewEntry};
