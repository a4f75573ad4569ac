use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use models::question::Model as Question;

use crate::clock::{Clock, SystemClock};
use crate::errors::ServiceError;
use crate::identity::ActingUser;
use crate::question::domain::{
    new_question, replacement_question, to_question_response, CreateQuestionRequest, GetQuestionResponse,
    UpdateQuestionRequest,
};
use crate::question::repository::{QuestionRepository, Storage, StorageTx};

/// Application service for questions.
/// Owns the transaction lifecycle and the ownership check; persistence is
/// delegated to the repository.
pub struct QuestionService<S, R, C = SystemClock> {
    storage: Arc<S>,
    repo: Arc<R>,
    clock: C,
}

impl<S, R> QuestionService<S, R, SystemClock>
where
    S: Storage,
    R: QuestionRepository<S::Tx>,
{
    pub fn new(storage: Arc<S>, repo: Arc<R>) -> Self { Self::with_clock(storage, repo, SystemClock) }
}

impl<S, R, C> QuestionService<S, R, C>
where
    S: Storage,
    R: QuestionRepository<S::Tx>,
    C: Clock,
{
    pub fn with_clock(storage: Arc<S>, repo: Arc<R>, clock: C) -> Self { Self { storage, repo, clock } }

    /// Create a question owned by `acting_user`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::identity::ActingUser;
    /// use service::question::{domain::CreateQuestionRequest, repository::mock::InMemoryStore, QuestionService};
    /// let store = Arc::new(InMemoryStore::default());
    /// let svc = QuestionService::new(store.clone(), store);
    /// let req = CreateQuestionRequest { module_id: 5, title: "What is TCP?".into(), tags: "networking".into(), description: "...".into() };
    /// let created = tokio_test::block_on(svc.create(req, ActingUser::new(11))).unwrap();
    /// assert_eq!(created.user_id, 11);
    /// assert_eq!(created.created_at, created.updated_at);
    /// ```
    #[instrument(skip(self, request), fields(acting_user = %acting_user, module_id = request.module_id))]
    pub async fn create(&self, request: CreateQuestionRequest, acting_user: ActingUser) -> Result<GetQuestionResponse, ServiceError> {
        let tx = self.storage.begin().await?;
        let result = self.repo.create(&tx, new_question(request, acting_user, self.clock.now())).await;
        let created = finalize(tx, result).await?;
        info!(question_id = created.id, user_id = created.user_id, "question_created");
        Ok(to_question_response(created))
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<GetQuestionResponse>, ServiceError> {
        let tx = self.storage.begin().await?;
        let result = self.repo.find_all(&tx).await;
        let questions = finalize(tx, result).await?;
        debug!(count = questions.len(), "questions_listed");
        Ok(questions.into_iter().map(to_question_response).collect())
    }

    #[instrument(skip(self))]
    pub async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<GetQuestionResponse>, ServiceError> {
        let tx = self.storage.begin().await?;
        let result = self.repo.find_by_user_id(&tx, user_id).await;
        let questions = finalize(tx, result).await?;
        debug!(count = questions.len(), "questions_listed_by_user");
        Ok(questions.into_iter().map(to_question_response).collect())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, question_id: i32) -> Result<GetQuestionResponse, ServiceError> {
        let tx = self.storage.begin().await?;
        let result = self.repo.find_by_id(&tx, question_id).await;
        let question = finalize(tx, result).await?;
        Ok(to_question_response(question))
    }

    /// Hard-delete a question; only its owner may do so.
    #[instrument(skip(self), fields(acting_user = %acting_user))]
    pub async fn delete(&self, question_id: i32, acting_user: ActingUser) -> Result<(), ServiceError> {
        let tx = self.storage.begin().await?;
        let result = self.delete_in(&tx, question_id, acting_user).await;
        finalize(tx, result).await?;
        info!(question_id, "question_deleted");
        Ok(())
    }

    async fn delete_in(&self, tx: &S::Tx, question_id: i32, acting_user: ActingUser) -> Result<(), ServiceError> {
        self.load_owned(tx, question_id, acting_user).await?;
        self.repo.delete(tx, question_id).await
    }

    /// Replace the content of a question; only its owner may do so.
    /// Returns the row as re-read after the write.
    #[instrument(skip(self, request), fields(acting_user = %acting_user))]
    pub async fn update(
        &self,
        request: UpdateQuestionRequest,
        question_id: i32,
        acting_user: ActingUser,
    ) -> Result<GetQuestionResponse, ServiceError> {
        let tx = self.storage.begin().await?;
        let result = self.update_in(&tx, request, question_id, acting_user).await;
        let updated = finalize(tx, result).await?;
        info!(question_id, "question_updated");
        Ok(to_question_response(updated))
    }

    async fn update_in(
        &self,
        tx: &S::Tx,
        request: UpdateQuestionRequest,
        question_id: i32,
        acting_user: ActingUser,
    ) -> Result<Question, ServiceError> {
        let existing = self.load_owned(tx, question_id, acting_user).await?;
        let replacement = replacement_question(&existing, request, self.clock.now());
        self.repo.update(tx, replacement, question_id).await?;
        self.repo.find_by_id(tx, question_id).await
    }

    /// Existence first, then ownership: a missing row is NotFound, never Forbidden.
    async fn load_owned(&self, tx: &S::Tx, question_id: i32, acting_user: ActingUser) -> Result<Question, ServiceError> {
        let existing = self.repo.find_by_id(tx, question_id).await?;
        if !acting_user.owns(existing.user_id) {
            warn!(question_id, owner = existing.user_id, "question_access_denied");
            return Err(ServiceError::access_not_allowed());
        }
        Ok(existing)
    }
}

/// Commit on `Ok`, roll back on `Err`. A failed rollback is only logged; the
/// operation's own error wins.
async fn finalize<T, Tx: StorageTx>(tx: Tx, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
