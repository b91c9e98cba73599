pub mod applications;
pub mod auth;
pub mod bookmarks;
pub mod jobs;
pub mod password;
pub mod users;
