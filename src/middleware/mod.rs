/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: 保護ルートの Authorization Gate
 * - cors / http: 全ルート共通の cross-cutting layer
 */
pub mod auth;
pub mod cors;
pub mod http;
