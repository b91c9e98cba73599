pub mod list;
pub mod toggle;
