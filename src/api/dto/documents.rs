/*
 * Responsibility
 * - policies / representatives / quizzes の query DTO
 * - document → response JSON の変換 (内部 ID と created_at / updated_at を載せる)
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::repos::document_repo::Document;

#[derive(Debug, Default, Deserialize)]
pub struct PolicyFilter {
    pub level: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepresentativeFilter {
    pub state: Option<String>,
    pub party: Option<String>,
    pub title: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizFilter {
    pub category: Option<String>,
    pub topic: Option<String>,
    pub limit: Option<i64>,
}

/// One policy's votes cast by a single representative.
#[derive(Debug, Serialize)]
pub struct VoteSummary {
    pub policy_id: Uuid,
    pub title: Value,
    pub summary: Value,
    pub votes: Vec<Value>,
}

pub fn render(doc: Document) -> Value {
    let mut map = match doc.body {
        Value::Object(map) => map,
        other => Map::from_iter([("body".to_string(), other)]),
    };
    map.insert("id".to_string(), Value::String(doc.id.to_string()));
    map.insert(
        "created_at".to_string(),
        Value::String(doc.created_at.to_rfc3339()),
    );
    map.insert(
        "updated_at".to_string(),
        Value::String(doc.updated_at.to_rfc3339()),
    );
    Value::Object(map)
}

/// Keep only the `voting_record` entries cast by `representative_id`.
pub fn summarize_votes(representative_id: Uuid, policies: Vec<Document>) -> Vec<VoteSummary> {
    let wanted = representative_id.to_string();

    policies
        .into_iter()
        .map(|doc| {
            let votes = doc
                .body
                .get("voting_record")
                .and_then(Value::as_array)
                .map(|record| {
                    record
                        .iter()
                        .filter(|vote| {
                            vote.get("representative_id").and_then(Value::as_str)
                                == Some(wanted.as_str())
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            VoteSummary {
                policy_id: doc.id,
                title: doc.body.get("title").cloned().unwrap_or(Value::Null),
                summary: doc.body.get("summary").cloned().unwrap_or(Value::Null),
                votes,
            }
        })
        .collect()
}
