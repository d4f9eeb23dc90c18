pub mod admin_service;
pub mod auth_service;
pub mod entitlement_service;
pub mod follow_service;
pub mod music_service;
pub mod payment_service;
pub mod user_service;
pub mod video_service;

pub mod cloudinary_service;
pub mod google_oauth_service;
pub mod mail_service;
pub mod paydunya_service;
