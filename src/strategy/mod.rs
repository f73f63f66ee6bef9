pub mod baseline;
pub mod grid_search;
pub mod policy;
pub mod traits;
