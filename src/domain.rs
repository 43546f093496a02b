pub mod assignment;
pub mod oms;
pub mod planner;
pub mod report;
pub mod routing;
pub mod spectrum;
pub mod topology;
pub mod utils;
