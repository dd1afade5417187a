pub mod catalog;
pub mod interaction;
pub mod recommendation;
