pub mod bitmap;
pub mod fragmentation;
pub mod grid;
