pub mod config;
pub mod health;
pub mod video_upload;
