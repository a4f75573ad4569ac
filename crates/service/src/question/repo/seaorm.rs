use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use models::question::{self, Model as Question, NewQuestion};

use crate::errors::ServiceError;
use crate::question::repository::{QuestionRepository, Storage, StorageTx};

/// Opens sea-orm transactions on a pooled connection.
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    type Tx = DatabaseTransaction;

    async fn begin(&self) -> Result<DatabaseTransaction, ServiceError> {
        Ok(TransactionTrait::begin(&self.db).await?)
    }
}

// Dropping an unfinished DatabaseTransaction rolls it back.
#[async_trait]
impl StorageTx for DatabaseTransaction {
    async fn commit(self) -> Result<(), ServiceError> {
        DatabaseTransaction::commit(self).await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), ServiceError> {
        DatabaseTransaction::rollback(self).await?;
        Ok(())
    }
}

pub struct SeaOrmQuestionRepository;

#[async_trait]
impl QuestionRepository<DatabaseTransaction> for SeaOrmQuestionRepository {
    async fn create(&self, tx: &DatabaseTransaction, question: NewQuestion) -> Result<Question, ServiceError> {
        Ok(question.into_active_model().insert(tx).await?)
    }

    async fn find_all(&self, tx: &DatabaseTransaction) -> Result<Vec<Question>, ServiceError> {
        let rows = question::Entity::find()
            .order_by_asc(question::Column::Id)
            .all(tx)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, tx: &DatabaseTransaction, id: i32) -> Result<Question, ServiceError> {
        question::Entity::find_by_id(id)
            .one(tx)
            .await?
            .ok_or_else(|| ServiceError::not_found("question", id))
    }

    async fn find_by_user_id(&self, tx: &DatabaseTransaction, user_id: i32) -> Result<Vec<Question>, ServiceError> {
        let rows = question::Entity::find()
            .filter(question::Column::UserId.eq(user_id))
            .order_by_asc(question::Column::Id)
            .all(tx)
            .await?;
        Ok(rows)
    }

    async fn update(&self, tx: &DatabaseTransaction, question: NewQuestion, id: i32) -> Result<Question, ServiceError> {
        let mut am = question.into_active_model();
        am.id = Unchanged(id);
        am.update(tx).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ServiceError::not_found("question", id),
            other => other.into(),
        })
    }

    async fn delete(&self, tx: &DatabaseTransaction, id: i32) -> Result<(), ServiceError> {
        let res = question::Entity::delete_by_id(id).exec(tx).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("question", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ActingUser;
    use crate::question::domain::{CreateQuestionRequest, UpdateQuestionRequest};
    use crate::question::QuestionService;
    use crate::test_support::get_db;
    use chrono::Utc;
    use std::sync::Arc;

    struct Fixture {
        db: DatabaseConnection,
        owner: models::user::Model,
        other: models::user::Model,
        module: models::module::Model,
    }

    impl Fixture {
        async fn new(db: DatabaseConnection) -> anyhow::Result<Self> {
            let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
            let owner = models::user::create(&db, &format!("owner_{}@example.com", stamp), "Owner").await?;
            let other = models::user::create(&db, &format!("other_{}@example.com", stamp), "Other").await?;
            let module = models::module::create(&db, "Networking").await?;
            Ok(Self { db, owner, other, module })
        }

        fn service(&self) -> QuestionService<SeaOrmStorage, SeaOrmQuestionRepository> {
            QuestionService::new(Arc::new(SeaOrmStorage::new(self.db.clone())), Arc::new(SeaOrmQuestionRepository))
        }

        fn create_req(&self, title: &str) -> CreateQuestionRequest {
            CreateQuestionRequest {
                module_id: self.module.id,
                title: title.into(),
                tags: "networking".into(),
                description: "...".into(),
            }
        }

        async fn cleanup(self) -> anyhow::Result<()> {
            models::user::hard_delete(&self.db, self.owner.id).await?;
            models::user::hard_delete(&self.db, self.other.id).await?;
            models::module::hard_delete(&self.db, self.module.id).await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn service_round_trip_against_postgres() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let fx = Fixture::new(db).await?;
        let svc = fx.service();
        let me = ActingUser::new(fx.owner.id);

        let a = svc.create(fx.create_req("What is TCP?"), me).await?;
        let b = svc.create(fx.create_req("What is UDP?"), me).await?;
        assert_eq!(a.user_id, fx.owner.id);
        assert_eq!(a.created_at, a.updated_at);

        let mine = svc.find_by_user_id(fx.owner.id).await?;
        assert_eq!(mine.iter().map(|q| q.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert!(svc.find_by_user_id(fx.other.id).await?.is_empty());

        let update = UpdateQuestionRequest {
            module_id: fx.module.id,
            title: "What is QUIC?".into(),
            tags: "transport".into(),
            description: "UDP based".into(),
        };
        let updated = svc.update(update, a.id, me).await?;
        assert_eq!(updated.title, "What is QUIC?");
        assert_eq!(updated.created_at, a.created_at);
        assert!(updated.updated_at > a.updated_at);

        svc.delete(b.id, me).await?;
        assert!(matches!(svc.find_by_id(b.id).await, Err(ServiceError::NotFound(_))));

        fx.cleanup().await
    }

    #[tokio::test]
    async fn forbidden_mutations_leave_row_untouched() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let fx = Fixture::new(db).await?;
        let svc = fx.service();
        let q = svc.create(fx.create_req("What is ARP?"), ActingUser::new(fx.owner.id)).await?;
        let intruder = ActingUser::new(fx.other.id);

        let err = svc.delete(q.id, intruder).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let update = UpdateQuestionRequest {
            module_id: fx.module.id,
            title: "hijacked".into(),
            tags: "".into(),
            description: "".into(),
        };
        let err = svc.update(update, q.id, intruder).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        assert_eq!(svc.find_by_id(q.id).await?, q);
        fx.cleanup().await
    }

    #[tokio::test]
    async fn repository_reports_missing_rows() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let storage = SeaOrmStorage::new(db);
        let repo = SeaOrmQuestionRepository;
        let tx = storage.begin().await?;
        assert!(matches!(repo.find_by_id(&tx, i32::MAX).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(repo.delete(&tx, i32::MAX).await, Err(ServiceError::NotFound(_))));
        StorageTx::rollback(tx).await?;
        Ok(())
    }

    #[tokio::test]
    async fn failed_insert_is_rolled_back() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let fx = Fixture::new(db).await?;
        let svc = fx.service();

        // Unknown module violates fk_question_module.
        let mut req = fx.create_req("orphan");
        req.module_id = i32::MAX;
        let err = svc.create(req, ActingUser::new(fx.owner.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        assert!(svc.find_by_user_id(fx.owner.id).await?.is_empty());

        fx.cleanup().await
    }
}
