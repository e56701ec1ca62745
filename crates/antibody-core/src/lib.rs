pub mod analytics;
pub mod campaign;
pub mod limits;
pub mod report;
