//! Item model shared by every managed collection.

/// Item trait, identity keys and the generic JSON record.
pub mod item;


pub use item::{Item, ItemKey, Record};
