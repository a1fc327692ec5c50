pub mod indexed_list;
pub mod slot_pool;

pub use indexed_list::{IndexedList, IndexedListIter};
pub use slot_pool::{Entry, ListId, SlotId, SlotPool};
