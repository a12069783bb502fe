pub mod color;
pub mod config;
pub mod data;
pub mod state;
