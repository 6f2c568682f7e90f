pub mod app;
pub mod auth;
pub mod config;
pub mod consents;
pub mod db;
pub mod error;
pub mod health;
pub mod mapper;
pub mod state;
pub mod validation;
