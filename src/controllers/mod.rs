pub mod admin_controller;
pub mod auth_controller;
pub mod event_controller;
pub mod music_controller;
pub mod payment_controller;
pub mod user_controller;
pub mod video_controller;
