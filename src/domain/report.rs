pub mod csv_report;
pub mod path_result;
