pub mod catalog;
pub mod harvest;
