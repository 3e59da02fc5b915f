use std::sync::Arc;

use tracing::{error, info};

use crate::auth::Session;
use crate::error::{AdminError, Result};
use crate::models::Record;
use crate::source::DataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error,
}

/// A transient message for the user, shown once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

/// Authoritative copy of one kind's collection.
///
/// The collection is an immutable snapshot; every change installs a new one.
#[derive(Debug)]
pub struct CollectionStore<R: Record> {
    status: LoadStatus,
    records: Arc<[R]>,
    notifications: Vec<Notification>,
}

impl<R: Record> Default for CollectionStore<R> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Loading,
            records: Arc::from(Vec::new()),
            notifications: Vec::new(),
        }
    }
}

impl<R: Record> CollectionStore<R> {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn snapshot(&self) -> Arc<[R]> {
        Arc::clone(&self.records)
    }

    /// Fetches the full collection.
    ///
    /// Fetch failures are absorbed: the store moves to `Error`, keeps the
    /// previous snapshot and queues a notification. Returns `Ok(true)` when a
    /// new snapshot was installed. `Unauthorized` is passed through untouched.
    pub async fn load<S: DataSource>(
        &mut self,
        source: &S,
        session: Option<&Session>,
    ) -> Result<bool> {
        match source.list::<R>(session).await {
            Ok(listing) => {
                info!(kind = %R::KIND, total = listing.total, "collection loaded");
                self.records = Arc::from(listing.records);
                self.status = LoadStatus::Ready;
                Ok(true)
            }
            Err(AdminError::Unauthorized) => Err(AdminError::Unauthorized),
            Err(err) => {
                error!(kind = %R::KIND, error = %err, "collection load failed");
                self.status = LoadStatus::Error;
                self.notifications.push(Notification {
                    message: format!("Failed to load {}", R::KIND),
                });
                Ok(false)
            }
        }
    }

    pub fn aggregate(&self) -> R::Stats {
        R::aggregate(&self.records)
    }

    /// Installs a snapshot in which the record with the same id is replaced.
    pub fn replace(&mut self, record: R) -> Result<()> {
        let id = record.id();
        let position = self
            .records
            .iter()
            .position(|existing| existing.id() == id)
            .ok_or(AdminError::NotFound { kind: R::KIND, id })?;

        let mut next = self.records.to_vec();
        next[position] = record;
        self.records = Arc::from(next);
        Ok(())
    }

    pub fn find(&self, id: u32) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
