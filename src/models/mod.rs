pub mod admin;
pub mod music;
pub mod order;
pub mod review;
pub mod user;
pub mod video;

pub mod database_helpers;
pub mod pagination;
