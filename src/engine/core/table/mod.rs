mod cursor;
mod hash_table;

pub use cursor::Cursor;
pub use hash_table::{EntryHandle, HashTable, TableStats};
