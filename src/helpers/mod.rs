pub mod music_helpers;
pub mod thing_helpers;
pub mod user_helpers;
