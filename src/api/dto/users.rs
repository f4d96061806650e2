/*
 * Responsibility
 * - Users の request/response DTO
 * - password / password_hash はどの response にも載せない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::Principal;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(email) = &self.email
            && email.trim().is_empty()
        {
            return Err("email cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Principal> for UserResponse {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_never_carries_the_hash() {
        let now = Utc::now();
        let user = UserResponse::from(Principal {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(&user).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 5);
        for key in ["id", "name", "email", "createdAt", "updatedAt"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn update_rejects_blank_fields_but_allows_absent_ones() {
        let empty = UpdateUserRequest {
            name: None,
            email: None,
        };
        assert!(empty.validate().is_ok());

        let blank = UpdateUserRequest {
            name: Some(" ".into()),
            email: None,
        };
        assert_eq!(blank.validate(), Err("name cannot be empty"));
    }
}
