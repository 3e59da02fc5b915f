//! The data source seam and the bundled in-memory implementation.

use std::future::Future;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::auth::{Session, SessionRegistry};
use crate::dataset::Dataset;
use crate::error::{AdminError, Result};
use crate::models::Record;

/// Entire collection of one kind, in the source's own order.
#[derive(Debug, Clone)]
pub struct Listing<R> {
    pub records: Vec<R>,
    pub total: usize,
}

/// Backend for list pages. Every call must carry a live session.
pub trait DataSource {
    fn list<R: Record>(
        &self,
        session: Option<&Session>,
    ) -> impl Future<Output = Result<Listing<R>>> + Send;

    fn get_by_id<R: Record>(
        &self,
        session: Option<&Session>,
        id: u32,
    ) -> impl Future<Output = Result<R>> + Send;

    /// Fails with `Validation` when `status` is outside the kind's set.
    fn update_status<R: Record>(
        &self,
        session: Option<&Session>,
        id: u32,
        status: &str,
    ) -> impl Future<Output = Result<R>> + Send;
}

/// Serves a [`Dataset`] from memory, accepting only sessions in its registry.
#[derive(Debug)]
pub struct MockSource {
    dataset: RwLock<Dataset>,
    sessions: SessionRegistry,
}

impl MockSource {
    pub fn new(dataset: Dataset, sessions: SessionRegistry) -> Self {
        Self {
            dataset: RwLock::new(dataset),
            sessions,
        }
    }

    fn authorize(&self, session: Option<&Session>) -> Result<()> {
        let Some(session) = session else {
            return Err(AdminError::Unauthorized);
        };
        let now = Utc::now();
        if session.is_expired(now) || !self.sessions.verify(session, now) {
            warn!(email = %session.user.email, "rejected session");
            return Err(AdminError::Unauthorized);
        }
        Ok(())
    }

    pub async fn snapshot(&self) -> Dataset {
        self.dataset.read().await.clone()
    }
}

impl DataSource for MockSource {
    #[instrument(skip_all, fields(kind = %R::KIND))]
    async fn list<R: Record>(&self, session: Option<&Session>) -> Result<Listing<R>> {
        self.authorize(session)?;
        let dataset = self.dataset.read().await;
        let records = R::collection(&dataset).clone();
        debug!(count = records.len(), "listed collection");
        Ok(Listing {
            total: records.len(),
            records,
        })
    }

    #[instrument(skip_all, fields(kind = %R::KIND, id = id))]
    async fn get_by_id<R: Record>(&self, session: Option<&Session>, id: u32) -> Result<R> {
        self.authorize(session)?;
        let dataset = self.dataset.read().await;
        R::collection(&dataset)
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or(AdminError::NotFound { kind: R::KIND, id })
    }

    #[instrument(skip_all, fields(kind = %R::KIND, id = id, status = %status))]
    async fn update_status<R: Record>(
        &self,
        session: Option<&Session>,
        id: u32,
        status: &str,
    ) -> Result<R> {
        self.authorize(session)?;
        let status: R::Status = status.parse()?;

        let mut dataset = self.dataset.write().await;
        let record = R::collection_mut(&mut dataset)
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(AdminError::NotFound { kind: R::KIND, id })?;

        // Replace the stored record wholesale.
        let mut updated = record.clone();
        updated.set_status(status);
        *record = updated.clone();
        info!("status updated");
        Ok(updated)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::AdminUser;
    use crate::models::{HelpRequest, Student};
    use crate::status::{RequestStatus, StatusTag};
    use chrono::Duration;
    use uuid::Uuid;

    const TOKEN: Uuid = Uuid::from_u128(0x0a11_ce00_5e55_1011_0000_0000_0000_0001);

    pub(crate) fn live_session() -> Session {
        Session {
            token: TOKEN,
            user: AdminUser {
                email: "admin@welfare.org".to_string(),
                name: "admin".to_string(),
                session_expires_at: Utc::now() + Duration::hours(1),
            },
        }
    }

    /// A source that has issued [`live_session`].
    pub(crate) fn source_with(dataset: Dataset) -> MockSource {
        let mut sessions = SessionRegistry::in_memory();
        sessions.register(&live_session()).unwrap();
        MockSource::new(dataset, sessions)
    }

    pub(crate) fn seeded_source() -> MockSource {
        source_with(Dataset::seeded())
    }

    #[tokio::test]
    async fn list_returns_collection_in_source_order() {
        let source = seeded_source();
        let session = live_session();
        let listing = source.list::<Student>(Some(&session)).await.unwrap();
        assert_eq!(listing.total, 3);
        let names: Vec<&str> = listing.records.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["Rahul Kumar", "Priya Sharma", "Amit Patel"]);
    }

    #[tokio::test]
    async fn missing_or_expired_sessions_are_unauthorized() {
        let source = seeded_source();
        assert!(matches!(
            source.list::<Student>(None).await,
            Err(AdminError::Unauthorized)
        ));

        let mut expired = live_session();
        expired.user.session_expires_at = Utc::now() - Duration::minutes(1);
        assert!(matches!(
            source.list::<Student>(Some(&expired)).await,
            Err(AdminError::Unauthorized)
        ));

        let mut stranger = live_session();
        stranger.user.email = "intruder@example.com".to_string();
        assert!(matches!(
            source.get_by_id::<Student>(Some(&stranger), 1).await,
            Err(AdminError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn sessions_never_issued_are_unauthorized() {
        let source = seeded_source();
        let mut forged = live_session();
        forged.token = Uuid::new_v4();
        forged.user.session_expires_at = Utc::now() + Duration::days(3650);
        assert!(matches!(
            source.list::<Student>(Some(&forged)).await,
            Err(AdminError::Unauthorized)
        ));
        assert!(matches!(
            source.update_status::<HelpRequest>(Some(&forged), 1, "completed").await,
            Err(AdminError::Unauthorized)
        ));

        let empty = MockSource::new(Dataset::seeded(), SessionRegistry::in_memory());
        assert!(matches!(
            empty.list::<Student>(Some(&live_session())).await,
            Err(AdminError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn get_by_id_reports_unknown_ids() {
        let source = seeded_source();
        let session = live_session();
        let found = source.get_by_id::<HelpRequest>(Some(&session), 2).await.unwrap();
        assert_eq!(found.request_type, "Medical Support");
        assert!(matches!(
            source.get_by_id::<HelpRequest>(Some(&session), 99).await,
            Err(AdminError::NotFound { id: 99, .. })
        ));
    }

    #[tokio::test]
    async fn update_status_validates_before_writing() {
        let source = seeded_source();
        let session = live_session();

        let rejected = source
            .update_status::<HelpRequest>(Some(&session), 1, "approved")
            .await;
        assert!(matches!(rejected, Err(AdminError::Validation(_))));
        assert_eq!(source.snapshot().await.requests[0].status, RequestStatus::Pending);

        let updated = source
            .update_status::<HelpRequest>(Some(&session), 1, "completed")
            .await
            .unwrap();
        assert_eq!(updated.status.as_str(), "completed");
        assert_eq!(source.snapshot().await.requests[0].status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn saved_snapshot_keeps_status_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let source = seeded_source();
        source
            .update_status::<HelpRequest>(Some(&live_session()), 2, "Completed")
            .await
            .unwrap();
        source.snapshot().await.save_json(&path).unwrap();

        let reloaded = Dataset::load_json(&path).unwrap();
        assert_eq!(reloaded.requests[1].status, RequestStatus::Completed);
        assert_eq!(reloaded.requests[0].status, RequestStatus::Pending);
    }
}
