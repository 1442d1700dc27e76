mod history;
mod slots;

pub use history::{HistoryStore, HISTORY_LIMIT, HISTORY_SLOT};
pub use slots::{FileSlotStore, MemorySlotStore, SlotStore};
