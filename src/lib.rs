pub mod db;
pub mod handlers;
pub mod services;
pub mod utils;
pub mod workflow;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
