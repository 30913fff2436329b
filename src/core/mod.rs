pub mod assistant;
pub mod errors;
pub mod models;
pub mod services;
pub mod validation;
