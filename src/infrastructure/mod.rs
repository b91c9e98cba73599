pub mod auth;
pub mod config;
pub mod db;
pub mod password;
pub mod pool;
pub mod repositories;
pub mod state;
