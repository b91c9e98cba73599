pub mod apply;
pub mod cancel;
pub mod list;
