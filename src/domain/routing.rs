pub mod computed_path;
pub mod disjunction;
pub mod request;
pub mod reverse;
pub mod router;
