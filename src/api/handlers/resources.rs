/*
 * Responsibility
 * - policies / representatives / quizzes 共通の CRUD handler (R: Resource で generic)
 * - public / protected の両ツリーが同じ関数を使う
 * - resource 固有の読み取り (location, votes) もここに置く
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    api::{
        dto::documents::{LocationQuery, VoteSummary, render, summarize_votes},
        extractors::{ResourceId, resource_id::RepresentativeId},
        resources::{Policy, Representative, Resource, prepare},
    },
    error::AppError,
    repos::document_repo::Collection,
    state::AppState,
};

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    query: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Query(filter) = query?;

    let docs = state
        .documents
        .find(R::COLLECTION, R::query(filter))
        .await?;

    Ok(Json(docs.into_iter().map(render).collect()))
}

pub async fn fetch<R: Resource>(
    State(state): State<AppState>,
    id: ResourceId<R>,
) -> Result<Json<Value>, AppError> {
    let doc = state
        .documents
        .get(R::COLLECTION, id.id)
        .await?
        .ok_or(AppError::NotFound(R::NAME))?;

    Ok(Json(render(doc)))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(body) = body?;
    let body = prepare::<R>(body)?;

    let doc = state.documents.insert(R::COLLECTION, body).await?;
    tracing::info!(collection = R::COLLECTION.as_str(), id = %doc.id, "document created");

    Ok((StatusCode::CREATED, Json(render(doc))))
}

pub async fn replace<R: Resource>(
    State(state): State<AppState>,
    id: ResourceId<R>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let body = prepare::<R>(body)?;

    let doc = state
        .documents
        .replace(R::COLLECTION, id.id, body)
        .await?
        .ok_or(AppError::NotFound(R::NAME))?;

    Ok(Json(render(doc)))
}

pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    id: ResourceId<R>,
) -> Result<StatusCode, AppError> {
    if state.documents.delete(R::COLLECTION, id.id).await? {
        tracing::info!(collection = R::COLLECTION.as_str(), id = %id.id, "document deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(R::NAME))
    }
}

pub async fn policies_by_location(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Path(us_state) = path?;
    let Query(location) = query?;
    let us_state = us_state.trim().to_string();
    if us_state.is_empty() {
        return Err(AppError::validation("State parameter is required"));
    }

    let docs = state
        .documents
        .find(
            Collection::Policies,
            Policy::by_location(us_state, location.city),
        )
        .await?;

    Ok(Json(docs.into_iter().map(render).collect()))
}

pub async fn representative_votes(
    State(state): State<AppState>,
    id: RepresentativeId,
) -> Result<Json<Vec<VoteSummary>>, AppError> {
    state
        .documents
        .get(Representative::COLLECTION, id.id)
        .await?
        .ok_or(AppError::NotFound(Representative::NAME))?;

    let policies = state
        .documents
        .find(Policy::COLLECTION, Policy::voted_on_by(id.id))
        .await?;

    Ok(Json(summarize_votes(id.id, policies)))
}
