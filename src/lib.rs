pub mod api;
pub mod config;
pub mod data_models;
pub mod relay;
pub mod search;
