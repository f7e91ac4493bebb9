pub mod config;
pub mod discord;
pub mod error;
pub mod feed;
pub mod model;
pub mod openliga;
pub mod render;
pub mod ticker;
