pub mod element;
pub mod graph;
