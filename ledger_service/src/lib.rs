pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod use_cases;
pub mod workers;
