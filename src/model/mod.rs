pub mod pipeline;
pub mod stock;
