pub mod auth;
pub mod health;
pub mod resources;
pub mod users;
