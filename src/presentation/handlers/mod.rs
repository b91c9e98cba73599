pub mod applications;
pub mod auth;
pub mod bookmarks;
pub mod health;
pub mod jobs;
pub mod users;
