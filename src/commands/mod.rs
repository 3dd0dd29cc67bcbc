pub mod apply;
pub mod inventory;
