use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use models::question::{Model as Question, NewQuestion};

use crate::identity::ActingUser;

/// Create input; the owner comes from the acting user, timestamps from the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQuestionRequest {
    pub module_id: i32,
    pub title: String,
    pub tags: String,
    pub description: String,
}

/// Update input; replaces every content field of the stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuestionRequest {
    pub module_id: i32,
    pub title: String,
    pub tags: String,
    pub description: String,
}

/// Read view of a question returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetQuestionResponse {
    pub id: i32,
    pub user_id: i32,
    pub module_id: i32,
    pub title: String,
    pub tags: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn to_question_response(question: Question) -> GetQuestionResponse {
    GetQuestionResponse {
        id: question.id,
        user_id: question.user_id,
        module_id: question.module_id,
        title: question.title,
        tags: question.tags,
        description: question.description,
        created_at: question.created_at.with_timezone(&Utc),
        updated_at: question.updated_at.with_timezone(&Utc),
    }
}

/// Fresh row owned by `owner`, stamped `now` on both timestamps.
pub fn new_question(request: CreateQuestionRequest, owner: ActingUser, now: DateTime<Utc>) -> NewQuestion {
    NewQuestion {
        user_id: owner.id(),
        module_id: request.module_id,
        title: request.title,
        tags: request.tags,
        description: request.description,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

/// Replacement row: owner and `created_at` come from `existing`.
///
/// `updated_at` is `now`, but always at least one microsecond (the storage
/// resolution) past `existing.updated_at`, even if the clock stepped back.
pub fn replacement_question(existing: &Question, request: UpdateQuestionRequest, now: DateTime<Utc>) -> NewQuestion {
    let floor = existing.updated_at.with_timezone(&Utc) + Duration::microseconds(1);
    NewQuestion {
        user_id: existing.user_id,
        module_id: request.module_id,
        title: request.title,
        tags: request.tags,
        description: request.description,
        created_at: existing.created_at,
        updated_at: now.max(floor).into(),
    }
}
