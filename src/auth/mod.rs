pub mod api_token;
pub mod password;
pub mod session;
