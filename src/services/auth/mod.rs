pub mod auth_service;
pub mod factory;
pub mod jwt;
pub mod password;
pub mod secret;

pub use auth_service::AuthService;
pub use factory::build_auth_service;
