pub mod applications;
pub mod bookmarks;
pub mod jobs;
pub mod users;
