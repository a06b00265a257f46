pub mod entry_mode;
pub mod index_entry;
pub mod lockfile;
