use async_trait::async_trait;

use models::question::{Model as Question, NewQuestion};

use crate::errors::ServiceError;

/// A unit of work opened by [`Storage::begin`]. Exactly one of `commit` or
/// `rollback` finalizes it.
#[async_trait]
pub trait StorageTx: Send + Sync + Sized {
    async fn commit(self) -> Result<(), ServiceError>;
    async fn rollback(self) -> Result<(), ServiceError>;
}

/// Storage handle able to open transactions.
#[async_trait]
pub trait Storage: Send + Sync {
    type Tx: StorageTx;

    async fn begin(&self) -> Result<Self::Tx, ServiceError>;
}

/// Raw question persistence; every call runs inside the caller's transaction.
#[async_trait]
pub trait QuestionRepository<Tx: Send + Sync>: Send + Sync {
    async fn create(&self, tx: &Tx, question: NewQuestion) -> Result<Question, ServiceError>;
    async fn find_all(&self, tx: &Tx) -> Result<Vec<Question>, ServiceError>;
    /// Fails with `NotFound` when no row has `id`.
    async fn find_by_id(&self, tx: &Tx, id: i32) -> Result<Question, ServiceError>;
    async fn find_by_user_id(&self, tx: &Tx, user_id: i32) -> Result<Vec<Question>, ServiceError>;
    async fn update(&self, tx: &Tx, question: NewQuestion, id: i32) -> Result<Question, ServiceError>;
    async fn delete(&self, tx: &Tx, id: i32) -> Result<(), ServiceError>;
}

/// Simple in-memory store for tests and doc examples.
///
/// Each transaction reads a private copy of the rows and records its writes.
/// Commit replays those writes onto the rows committed at that moment, so
/// overlapping transactions keep each other's changes; rollback drops them.
/// Ids come from a shared counter and are never reused.
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Operations that can be made to fail on demand
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum MockOp {
        Begin,
        Commit,
        Create,
        FindAll,
        FindById,
        FindByUserId,
        Update,
        Delete,
    }

    #[derive(Clone, Debug)]
    enum Write {
        Insert(Question),
        Replace(Question),
        Remove(i32),
    }

    #[derive(Default)]
    struct Shared {
        committed: Mutex<Vec<Question>>,
        last_id: Mutex<i32>,
        commits: Mutex<usize>,
        rollbacks: Mutex<usize>,
        failing: Mutex<Vec<MockOp>>,
    }

    impl Shared {
        fn check(&self, op: MockOp) -> Result<(), ServiceError> {
            if self.failing.lock().unwrap().contains(&op) {
                return Err(ServiceError::Db(format!("injected {:?} failure", op)));
            }
            Ok(())
        }

        fn next_id(&self) -> i32 {
            let mut last = self.last_id.lock().unwrap();
            *last += 1;
            *last
        }
    }

    #[derive(Clone, Default)]
    pub struct InMemoryStore {
        shared: Arc<Shared>,
    }

    #[derive(Default)]
    struct TxState {
        rows: Vec<Question>,
        writes: Vec<Write>,
    }

    pub struct InMemoryTx {
        shared: Arc<Shared>,
        state: Mutex<TxState>,
    }

    impl InMemoryStore {
        /// Insert a committed row as-is (its id is kept).
        pub fn seed(&self, question: Question) {
            let mut last = self.shared.last_id.lock().unwrap();
            *last = (*last).max(question.id);
            self.shared.committed.lock().unwrap().push(question);
        }

        /// Committed rows in insertion order.
        pub fn rows(&self) -> Vec<Question> {
            self.shared.committed.lock().unwrap().clone()
        }

        pub fn commits(&self) -> usize { *self.shared.commits.lock().unwrap() }

        pub fn rollbacks(&self) -> usize { *self.shared.rollbacks.lock().unwrap() }

        /// Make every later `op` fail with a database error.
        pub fn fail_on(&self, op: MockOp) {
            self.shared.failing.lock().unwrap().push(op);
        }
    }

    #[async_trait]
    impl StorageTx for InMemoryTx {
        async fn commit(self) -> Result<(), ServiceError> {
            self.shared.check(MockOp::Commit)?;
            let writes = self.state.into_inner().unwrap().writes;
            let mut committed = self.shared.committed.lock().unwrap();
            for write in writes {
                match write {
                    Write::Insert(row) => committed.push(row),
                    Write::Replace(row) => {
                        if let Some(slot) = committed.iter_mut().find(|q| q.id == row.id) {
                            *slot = row;
                        }
                    }
                    Write::Remove(id) => committed.retain(|q| q.id != id),
                }
            }
            drop(committed);
            *self.shared.commits.lock().unwrap() += 1;
            Ok(())
        }

        async fn rollback(self) -> Result<(), ServiceError> {
            *self.shared.rollbacks.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl Storage for InMemoryStore {
        type Tx = InMemoryTx;

        async fn begin(&self) -> Result<InMemoryTx, ServiceError> {
            self.shared.check(MockOp::Begin)?;
            let rows = self.shared.committed.lock().unwrap().clone();
            Ok(InMemoryTx {
                shared: Arc::clone(&self.shared),
                state: Mutex::new(TxState { rows, writes: Vec::new() }),
            })
        }
    }

    #[async_trait]
    impl QuestionRepository<InMemoryTx> for InMemoryStore {
        async fn create(&self, tx: &InMemoryTx, question: NewQuestion) -> Result<Question, ServiceError> {
            tx.shared.check(MockOp::Create)?;
            let row = question.with_id(tx.shared.next_id());
            let mut state = tx.state.lock().unwrap();
            state.rows.push(row.clone());
            state.writes.push(Write::Insert(row.clone()));
            Ok(row)
        }

        async fn find_all(&self, tx: &InMemoryTx) -> Result<Vec<Question>, ServiceError> {
            tx.shared.check(MockOp::FindAll)?;
            Ok(tx.state.lock().unwrap().rows.clone())
        }

        async fn find_by_id(&self, tx: &InMemoryTx, id: i32) -> Result<Question, ServiceError> {
            tx.shared.check(MockOp::FindById)?;
            tx.state
                .lock()
                .unwrap()
                .rows
                .iter()
                .find(|q| q.id == id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("question", id))
        }

        async fn find_by_user_id(&self, tx: &InMemoryTx, user_id: i32) -> Result<Vec<Question>, ServiceError> {
            tx.shared.check(MockOp::FindByUserId)?;
            Ok(tx.state.lock().unwrap().rows.iter().filter(|q| q.user_id == user_id).cloned().collect())
        }

        async fn update(&self, tx: &InMemoryTx, question: NewQuestion, id: i32) -> Result<Question, ServiceError> {
            tx.shared.check(MockOp::Update)?;
            let mut state = tx.state.lock().unwrap();
            let slot = state
                .rows
                .iter_mut()
                .find(|q| q.id == id)
                .ok_or_else(|| ServiceError::not_found("question", id))?;
            *slot = question.with_id(id);
            let row = slot.clone();
            state.writes.push(Write::Replace(row.clone()));
            Ok(row)
        }

        async fn delete(&self, tx: &InMemoryTx, id: i32) -> Result<(), ServiceError> {
            tx.shared.check(MockOp::Delete)?;
            let mut state = tx.state.lock().unwrap();
            let before = state.rows.len();
            state.rows.retain(|q| q.id != id);
            if state.rows.len() == before {
                return Err(ServiceError::not_found("question", id));
            }
            state.writes.push(Write::Remove(id));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryStore;
    use super::*;
    use chrono::{TimeZone, Utc};

    fn draft(user_id: i32, title: &str) -> NewQuestion {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into();
        NewQuestion {
            user_id,
            module_id: 5,
            title: title.into(),
            tags: "networking".into(),
            description: "".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn overlapping_creates_both_survive_with_distinct_ids() {
        let store = InMemoryStore::default();
        let a = store.begin().await.unwrap();
        let b = store.begin().await.unwrap();
        let qa = store.create(&a, draft(11, "from a")).await.unwrap();
        let qb = store.create(&b, draft(12, "from b")).await.unwrap();
        assert_ne!(qa.id, qb.id);

        a.commit().await.unwrap();
        b.commit().await.unwrap();
        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.contains(&qa) && rows.contains(&qb));
    }

    #[tokio::test]
    async fn concurrent_transactions_keep_each_others_writes() {
        let store = InMemoryStore::default();
        let setup = store.begin().await.unwrap();
        let kept = store.create(&setup, draft(11, "kept")).await.unwrap();
        let doomed = store.create(&setup, draft(11, "doomed")).await.unwrap();
        setup.commit().await.unwrap();

        let editor = store.begin().await.unwrap();
        let remover = store.begin().await.unwrap();
        let edited = store.update(&editor, draft(11, "edited"), kept.id).await.unwrap();
        store.delete(&remover, doomed.id).await.unwrap();
        remover.commit().await.unwrap();
        editor.commit().await.unwrap();

        assert_eq!(store.rows(), vec![edited]);
    }

    #[tokio::test]
    async fn uncommitted_writes_are_private_and_dropped_on_rollback() {
        let store = InMemoryStore::default();
        let writer = store.begin().await.unwrap();
        store.create(&writer, draft(11, "pending")).await.unwrap();

        let reader = store.begin().await.unwrap();
        assert!(store.find_all(&reader).await.unwrap().is_empty());
        reader.rollback().await.unwrap();

        writer.rollback().await.unwrap();
        assert!(store.rows().is_empty());
        assert_eq!(store.rollbacks(), 2);

        let next = store.begin().await.unwrap();
        let q = store.create(&next, draft(11, "after")).await.unwrap();
        assert_eq!(q.id, 2);
    }
}
