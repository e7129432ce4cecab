// Store I/O
//
// Reads are tolerant: a missing or unreadable store loads as empty.
// Writes replace the whole file and create parent directories.

pub mod catalog;
pub mod missing;
pub mod sets;
pub mod sync;
pub mod text;
mod write;

pub use catalog::{load_catalog, save_catalog};
pub use missing::{load_missing, save_missing};
pub use sets::save_sets;
pub use sync::{load_sync, save_sync};
pub use text::{find_reference, load_foil_list, read_reference};
