pub mod demand;
pub mod forecast;
pub mod reporting;
