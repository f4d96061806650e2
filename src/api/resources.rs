//! Civic document resources served by the generic handlers in `handlers::resources`.
//!
//! Each marker type names its collection, the fields a body must carry and how its
//! query string becomes a JSONB containment filter.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::dto::documents::{PolicyFilter, QuizFilter, RepresentativeFilter};
use crate::api::extractors::IdLabel;
use crate::error::AppError;
use crate::repos::document_repo::{Collection, DocumentQuery};

pub const DEFAULT_POLICY_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

pub trait Resource: IdLabel + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Singular display name, as in "Policy not found".
    const NAME: &'static str;
    /// Fields that must be present and non-blank on create/replace.
    const REQUIRED: &'static [&'static str];

    type Filter: DeserializeOwned + Send + 'static;

    fn query(filter: Self::Filter) -> DocumentQuery;

    /// Last touch on a validated body before it is written.
    fn stamp(_body: &mut Map<String, Value>) {}
}

pub enum Policy {}
pub enum Representative {}
pub enum Quiz {}

impl IdLabel for Policy {
    const INVALID_ID: &'static str = "Invalid policy ID";
}

impl IdLabel for Representative {
    const INVALID_ID: &'static str = "Invalid representative ID";
}

impl IdLabel for Quiz {
    const INVALID_ID: &'static str = "Invalid quiz ID";
}

impl Resource for Policy {
    const COLLECTION: Collection = Collection::Policies;
    const NAME: &'static str = "Policy";
    const REQUIRED: &'static [&'static str] = &["title"];

    type Filter = PolicyFilter;

    fn query(f: PolicyFilter) -> DocumentQuery {
        let mut filter = Map::new();
        insert_some(&mut filter, "level", f.level);
        insert_some(&mut filter, "status", f.status);
        insert_some(&mut filter, "type", f.kind);
        if let Some(jurisdiction) = jurisdiction(f.state, f.city) {
            filter.insert("jurisdiction".to_string(), jurisdiction);
        }

        DocumentQuery {
            filter: Value::Object(filter),
            sort_desc_by: Some("introduced_date"),
            limit: Some(clamp_limit(f.limit.unwrap_or(DEFAULT_POLICY_LIMIT))),
        }
    }

    fn stamp(body: &mut Map<String, Value>) {
        body.insert(
            "last_updated".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
}

impl Policy {
    /// Every policy in `state` (and `city`, when given), newest first, unbounded.
    pub fn by_location(state: String, city: Option<String>) -> DocumentQuery {
        let filter = jurisdiction(Some(state), city)
            .map(|j| serde_json::json!({ "jurisdiction": j }))
            .unwrap_or_else(|| Value::Object(Map::new()));

        DocumentQuery {
            filter,
            sort_desc_by: Some("introduced_date"),
            limit: None,
        }
    }

    /// Policies whose `voting_record` holds a vote by `representative_id`.
    pub fn voted_on_by(representative_id: uuid::Uuid) -> DocumentQuery {
        DocumentQuery {
            filter: serde_json::json!({
                "voting_record": [{ "representative_id": representative_id.to_string() }]
            }),
            sort_desc_by: Some("introduced_date"),
            limit: None,
        }
    }
}

impl Resource for Representative {
    const COLLECTION: Collection = Collection::Representatives;
    const NAME: &'static str = "Representative";
    const REQUIRED: &'static [&'static str] = &["name"];

    type Filter = RepresentativeFilter;

    fn query(f: RepresentativeFilter) -> DocumentQuery {
        let mut filter = Map::new();
        insert_some(&mut filter, "state", f.state);
        insert_some(&mut filter, "party", f.party);
        insert_some(&mut filter, "title", f.title);

        DocumentQuery {
            filter: Value::Object(filter),
            sort_desc_by: None,
            limit: f.limit.map(clamp_limit),
        }
    }
}

impl Resource for Quiz {
    const COLLECTION: Collection = Collection::Quizzes;
    const NAME: &'static str = "Quiz";
    const REQUIRED: &'static [&'static str] = &["title"];

    type Filter = QuizFilter;

    fn query(f: QuizFilter) -> DocumentQuery {
        let mut filter = Map::new();
        // `categories` is a list on the document
        if let Some(category) = non_blank(f.category) {
            filter.insert(
                "categories".to_string(),
                Value::Array(vec![Value::String(category)]),
            );
        }
        insert_some(&mut filter, "topic", f.topic);

        DocumentQuery {
            filter: Value::Object(filter),
            sort_desc_by: None,
            limit: f.limit.map(clamp_limit),
        }
    }
}

/// Validate a client body for `R` and strip fields the store owns.
pub fn prepare<R: Resource>(body: Value) -> Result<Value, AppError> {
    let Value::Object(mut map) = body else {
        return Err(AppError::validation("Invalid request body"));
    };
    for owned in ["id", "created_at", "updated_at"] {
        map.remove(owned);
    }

    for field in R::REQUIRED {
        let present = match map.get(*field) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if !present {
            return Err(AppError::validation(format!("{field} is required")));
        }
    }

    R::stamp(&mut map);
    Ok(Value::Object(map))
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIMIT)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn insert_some(filter: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(v) = non_blank(value) {
        filter.insert(key.to_string(), Value::String(v));
    }
}

fn jurisdiction(state: Option<String>, city: Option<String>) -> Option<Value> {
    let mut j = Map::new();
    insert_some(&mut j, "state", state);
    insert_some(&mut j, "city", city);
    (!j.is_empty()).then_some(Value::Object(j))
}
