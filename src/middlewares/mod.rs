pub mod mw_auth;
pub mod mw_rate_limit;
pub mod mw_role;
