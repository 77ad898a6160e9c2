mod export;
mod item;
mod store;

pub use export::{export_csv, export_file_name};
pub use item::{AgendaItem, ItemStatus};
pub use store::AgendaStore;
