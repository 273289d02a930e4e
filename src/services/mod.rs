pub mod assistant;
pub mod catalog;
