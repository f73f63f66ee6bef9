pub mod config;
pub mod engine;
pub mod experiment;
pub mod monte_carlo;
pub mod seeding;
pub mod stats;
pub mod validation;
