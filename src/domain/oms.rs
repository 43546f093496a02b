pub mod oms;
pub mod partitioner;
