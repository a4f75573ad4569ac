use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{} {} not found", entity, id)) }

    pub fn access_not_allowed() -> Self { Self::Forbidden("access not allowed".into()) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 1003,
            ServiceError::Forbidden(_) => 1004,
            ServiceError::Db(_) => 1200,
        }
    }

    /// HTTP status a handler layer should answer with.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::Forbidden(_) => 403,
            ServiceError::Db(_) => 500,
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e {
            sea_orm::DbErr::RecordNotFound(msg) => ServiceError::NotFound(msg),
            sea_orm::DbErr::RecordNotUpdated => ServiceError::NotFound("record not updated".into()),
            other => ServiceError::Db(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_codes_and_statuses() {
        let errs = [
            ServiceError::not_found("question", 7),
            ServiceError::access_not_allowed(),
            ServiceError::Db("connection reset".into()),
        ];
        let codes: Vec<u16> = errs.iter().map(ServiceError::code).collect();
        let statuses: Vec<u16> = errs.iter().map(ServiceError::status).collect();
        assert_eq!(codes, vec![1003, 1004, 1200]);
        assert_eq!(statuses, vec![404, 403, 500]);
    }

    #[test]
    fn messages_are_readable() {
        assert_eq!(ServiceError::not_found("question", 7).to_string(), "not found: question 7 not found");
        assert_eq!(ServiceError::access_not_allowed().to_string(), "forbidden: access not allowed");
    }

    #[test]
    fn db_errors_keep_their_kind() {
        let e: ServiceError = sea_orm::DbErr::RecordNotUpdated.into();
        assert!(matches!(e, ServiceError::NotFound(_)));
        let e: ServiceError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(e, ServiceError::Db(ref m) if m.contains("boom")));
    }
}
