pub mod capability;
pub mod models;
pub mod password_service;
pub mod token_service;
