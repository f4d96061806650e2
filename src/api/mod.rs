/*
 * Responsibility
 * - HTTP API 層の公開インターフェース (routes() の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod resources;
mod routes;

pub use routes::routes;
