/*
 * Responsibility
 * - /api 配下の URL 構造を定義 (Route Partitioner)
 * - public ツリー (`/public` 以下) と protected ツリーを同じ builder から Surface 違いで作る
 * - Gate は protected ツリーにだけ route_layer で掛ける
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::{login, register},
    health::health,
    resources::{
        create, fetch, list, policies_by_location, remove, replace, representative_votes,
    },
    users::{delete_user, get_user, list_users, me, update_user},
};
use crate::api::resources::{Policy, Quiz, Representative, Resource};
use crate::middleware::auth::access;
use crate::state::AppState;

/// Which operations a tree exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Unauthenticated reads under `/public`.
    ReadOnly,
    /// Everything, behind the Gate.
    ReadWrite,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .nest("/public", tree(Surface::ReadOnly));

    let protected = access::apply(tree(Surface::ReadWrite), state);

    open.merge(protected)
}

fn tree(surface: Surface) -> Router<AppState> {
    Router::new()
        .merge(users(surface))
        .merge(documents::<Policy>(surface))
        .merge(documents::<Representative>(surface))
        .merge(documents::<Quiz>(surface))
        .route(
            "/policies/location/{state}",
            get(policies_by_location),
        )
        .route(
            "/representatives/{id}/votes",
            get(representative_votes),
        )
}

fn users(surface: Surface) -> Router<AppState> {
    match surface {
        Surface::ReadOnly => Router::new().route("/users/{id}", get(get_user)),
        Surface::ReadWrite => Router::new()
            .route("/users", get(list_users))
            .route("/users/me", get(me))
            .route(
                "/users/{id}",
                get(get_user).put(update_user).delete(delete_user),
            ),
    }
}

fn documents<R: Resource>(surface: Surface) -> Router<AppState> {
    let collection = format!("/{}", R::COLLECTION.as_str());
    let item = format!("/{}/{{id}}", R::COLLECTION.as_str());

    match surface {
        Surface::ReadOnly => Router::new()
            .route(&collection, get(list::<R>))
            .route(&item, get(fetch::<R>)),
        Surface::ReadWrite => Router::new()
            .route(&collection, get(list::<R>).post(create::<R>))
            .route(
                &item,
                get(fetch::<R>).put(replace::<R>).delete(remove::<R>),
            ),
    }
}
