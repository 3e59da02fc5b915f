//! One configurable controller behind every list page.
//!
//! A page supplies its record type and, optionally, its own search fields,
//! aggregate and starting page size. The controller owns the collection store,
//! the query, the pager and the detail selection, and keeps the derived
//! filtered view and stats in step with them.

use tracing::debug;

use crate::auth::Session;
use crate::error::{AdminError, Result};
use crate::filter::{self, SearchFields};
use crate::models::Record;
use crate::pagination::{PageSize, Pagination};
use crate::selection::Selection;
use crate::source::DataSource;
use crate::store::{CollectionStore, LoadStatus, Notification};

pub struct ListConfig<R: Record> {
    pub search: SearchFields<R>,
    pub aggregate: fn(&[R]) -> R::Stats,
    pub page_size: PageSize,
}

impl<R: Record> Default for ListConfig<R> {
    fn default() -> Self {
        Self {
            search: R::search_fields,
            aggregate: R::aggregate,
            page_size: PageSize::default(),
        }
    }
}

impl<R: Record> ListConfig<R> {
    pub fn with_search(mut self, search: SearchFields<R>) -> Self {
        self.search = search;
        self
    }

    pub fn with_aggregate(mut self, aggregate: fn(&[R]) -> R::Stats) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Everything a page needs to draw itself.
#[derive(Debug)]
pub struct ListView<'a, R: Record> {
    pub status: LoadStatus,
    pub stats: &'a R::Stats,
    pub rows: Vec<&'a R>,
    pub query: &'a str,
    pub total: usize,
    pub matched: usize,
    pub page: usize,
    pub page_size: PageSize,
    pub page_count: usize,
    pub first_row: usize,
    pub selected: Option<&'a R>,
}

impl<R: Record> ListView<'_, R> {
    /// Loaded, but nothing matches the query.
    pub fn is_empty_result(&self) -> bool {
        self.status != LoadStatus::Loading && self.matched == 0
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

pub struct ListController<R: Record> {
    config: ListConfig<R>,
    store: CollectionStore<R>,
    query: String,
    filtered: Vec<usize>,
    stats: R::Stats,
    pagination: Pagination,
    selection: Selection<R>,
}

impl<R: Record> Default for ListController<R> {
    fn default() -> Self {
        Self::new(ListConfig::default())
    }
}

impl<R: Record> ListController<R> {
    pub fn new(config: ListConfig<R>) -> Self {
        let pagination = Pagination::new(config.page_size);
        Self {
            config,
            store: CollectionStore::default(),
            query: String::new(),
            filtered: Vec::new(),
            stats: R::Stats::default(),
            pagination,
            selection: Selection::default(),
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.store.status()
    }

    pub fn records(&self) -> &[R] {
        self.store.records()
    }

    pub fn stats(&self) -> &R::Stats {
        &self.stats
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn selected(&self) -> Option<&R> {
        self.selection.current()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.store.take_notifications()
    }

    /// Loads the collection; see [`CollectionStore::load`] for failure handling.
    pub async fn load<S: DataSource>(&mut self, source: &S, session: Option<&Session>) -> Result<()> {
        if self.store.load(source, session).await? {
            self.collection_changed();
        }
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page);
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        self.pagination.set_page_size(PageSize::try_from(size)?);
        Ok(())
    }

    /// Matching records, in collection order.
    pub fn filtered(&self) -> Vec<&R> {
        let records = self.store.records();
        self.filtered.iter().map(|&index| &records[index]).collect()
    }

    /// Rows on the current page.
    pub fn window(&self) -> Vec<&R> {
        let records = self.store.records();
        self.pagination
            .window(&self.filtered)
            .iter()
            .map(|&index| &records[index])
            .collect()
    }

    /// Opens the detail view on a record of the loaded collection.
    pub fn select(&mut self, id: u32) -> Result<R> {
        let record = self
            .store
            .find(id)
            .cloned()
            .ok_or(AdminError::NotFound { kind: R::KIND, id })?;
        self.selection.select(record.clone());
        Ok(record)
    }

    /// Opens the detail view on a freshly fetched copy of the record.
    pub async fn open_detail<S: DataSource>(
        &mut self,
        source: &S,
        session: Option<&Session>,
        id: u32,
    ) -> Result<R> {
        let record = source.get_by_id::<R>(session, id).await?;
        self.selection.select(record.clone());
        Ok(record)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Changes one record's status through the source.
    ///
    /// On any failure the loaded collection is left exactly as it was.
    pub async fn update_status<S: DataSource>(
        &mut self,
        source: &S,
        session: Option<&Session>,
        id: u32,
        status: &str,
    ) -> Result<R> {
        status.parse::<R::Status>()?;
        if self.store.find(id).is_none() {
            return Err(AdminError::NotFound { kind: R::KIND, id });
        }

        let updated = source.update_status::<R>(session, id, status).await?;
        self.store.replace(updated.clone())?;
        self.selection
            .refresh_with(updated.clone(), |current, fresh| current.id() == fresh.id());
        self.collection_changed();
        Ok(updated)
    }

    pub fn view(&self) -> ListView<'_, R> {
        let bounds = self.pagination.bounds(self.filtered.len());
        ListView {
            status: self.store.status(),
            stats: &self.stats,
            rows: self.window(),
            query: &self.query,
            total: self.store.records().len(),
            matched: self.filtered.len(),
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
            page_count: self.pagination.page_count(self.filtered.len()),
            first_row: bounds.start,
            selected: self.selection.current(),
        }
    }

    fn collection_changed(&mut self) {
        self.stats = (self.config.aggregate)(self.store.records());
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter::filter_indices(self.store.records(), &self.query, self.config.search);
        self.pagination.reset();
        debug!(kind = %R::KIND, matched = self.filtered.len(), query = %self.query, "filter applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::StudentStats;
    use crate::dataset::Dataset;
    use crate::models::{Donator, HelpRequest, Student};
    use crate::source::tests::{live_session, seeded_source, source_with};
    use crate::source::MockSource;
    use crate::status::RequestStatus;
    use crate::store::tests::OfflineSource;

    async fn loaded<R: Record>(source: &MockSource) -> ListController<R> {
        let mut controller = ListController::<R>::default();
        controller.load(source, Some(&live_session())).await.unwrap();
        controller
    }

    fn ids<R: Record>(rows: &[&R]) -> Vec<u32> {
        rows.iter().map(|r| r.id()).collect()
    }

    #[tokio::test]
    async fn blank_query_shows_everything_in_order() {
        let source = seeded_source();
        let controller = loaded::<Student>(&source).await;

        let view = controller.view();
        assert_eq!(ids(&view.rows), vec![1, 2, 3]);
        assert_eq!(view.page_size.get(), 10);
        assert!((view.stats.average_score - 61.0).abs() < 0.001);
        assert_eq!(view.stats.top_performer.as_ref().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn query_narrows_rows_and_resets_page() {
        let source = seeded_source();
        let mut controller = loaded::<Student>(&source).await;
        controller.set_page(3);

        controller.set_query("amit");
        assert_eq!(controller.pagination().page(), 0);
        assert_eq!(ids(&controller.window()), vec![3]);
        assert_eq!(controller.stats().total, 3);

        controller.set_query("nobody");
        let view = controller.view();
        assert!(view.is_empty_result());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn page_size_changes_return_to_first_page() {
        let mut dataset = Dataset::seeded();
        for n in 0..9 {
            let mut extra = dataset.students[0].clone();
            extra.full_name = format!("Volunteer {n}");
            dataset.insert(extra);
        }
        let source = source_with(dataset);
        let mut controller = loaded::<Student>(&source).await;

        controller.set_page_size(5).unwrap();
        controller.set_page(2);
        assert_eq!(ids(&controller.window()), vec![11, 12]);

        controller.set_page_size(25).unwrap();
        assert_eq!(controller.pagination().page(), 0);
        assert_eq!(controller.window().len(), 12);

        assert!(matches!(controller.set_page_size(3), Err(AdminError::Validation(_))));
        assert_eq!(controller.pagination().page_size().get(), 25);
    }

    #[tokio::test]
    async fn out_of_range_page_is_an_empty_window() {
        let source = seeded_source();
        let mut controller = loaded::<Donator>(&source).await;
        controller.set_page(7);
        assert!(controller.window().is_empty());
        assert_eq!(controller.filtered().len(), 3);
    }

    #[tokio::test]
    async fn invalid_status_update_leaves_collection_unchanged() {
        let source = seeded_source();
        let session = live_session();
        let mut controller = loaded::<HelpRequest>(&source).await;
        let before = controller.records().to_vec();

        let result = controller
            .update_status(&source, Some(&session), 1, "archived")
            .await;
        assert!(matches!(result, Err(AdminError::Validation(_))));

        let after = controller.records();
        assert_eq!(after.len(), before.len());
        assert!(before
            .iter()
            .zip(after)
            .all(|(a, b)| a.id == b.id && a.status == b.status));
    }

    #[tokio::test]
    async fn status_update_refreshes_stats_and_selection() {
        let source = seeded_source();
        let session = live_session();
        let mut controller = loaded::<HelpRequest>(&source).await;
        assert_eq!(controller.stats().pending, 1);

        controller.select(1).unwrap();
        controller
            .update_status(&source, Some(&session), 1, "in_progress")
            .await
            .unwrap();

        assert_eq!(controller.stats().pending, 0);
        assert_eq!(controller.stats().in_progress, 2);
        assert_eq!(
            controller.selected().map(|r| r.status.clone()),
            Some(RequestStatus::InProgress)
        );
    }

    #[tokio::test]
    async fn unknown_ids_do_not_open_the_detail_view() {
        let source = seeded_source();
        let session = live_session();
        let mut controller = loaded::<Student>(&source).await;

        assert!(matches!(controller.select(9), Err(AdminError::NotFound { id: 9, .. })));
        assert!(controller.selected().is_none());

        let fetched = controller.open_detail(&source, Some(&session), 2).await.unwrap();
        assert_eq!(fetched.full_name, "Priya Sharma");
        assert!(controller.view().selected.is_some());

        controller.clear_selection();
        assert!(controller.selected().is_none());

        assert!(controller
            .update_status(&source, Some(&session), 77, "active")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn offline_source_degrades_to_error_state() {
        let source = seeded_source();
        let session = live_session();
        let mut controller = loaded::<Student>(&source).await;
        controller.set_query("priya");

        controller.load(&OfflineSource, Some(&session)).await.unwrap();
        assert_eq!(controller.status(), LoadStatus::Error);
        assert_eq!(ids(&controller.window()), vec![2]);
        assert_eq!(controller.take_notifications().len(), 1);
    }

    #[tokio::test]
    async fn custom_config_replaces_search_and_aggregate() {
        fn college_only(student: &Student) -> Vec<&str> {
            vec![student.college.as_str()]
        }
        fn count_only(students: &[Student]) -> StudentStats {
            StudentStats {
                total: students.len(),
                ..StudentStats::default()
            }
        }

        let source = seeded_source();
        let config = ListConfig::<Student>::default()
            .with_search(college_only)
            .with_aggregate(count_only)
            .with_page_size(PageSize::try_from(5).unwrap());
        let mut controller = ListController::new(config);
        controller.load(&source, Some(&live_session())).await.unwrap();

        controller.set_query("pilani");
        assert_eq!(ids(&controller.window()), vec![3]);
        controller.set_query("amit");
        assert!(controller.window().is_empty());
        assert_eq!(controller.stats().total, 3);
        assert_eq!(controller.stats().average_score, 0.0);
        assert_eq!(controller.pagination().page_size().get(), 5);
    }

    #[tokio::test]
    async fn status_text_can_be_searched() {
        let source = seeded_source();
        let mut controller = loaded::<Student>(&source).await;
        controller.set_query("inactive");
        // Student search does not cover status.
        assert!(controller.window().is_empty());

        let mut requests = loaded::<HelpRequest>(&source).await;
        requests.set_query("COMPLETED");
        assert_eq!(ids(&requests.window()), vec![3]);
        assert_eq!(
            requests.records().iter().filter(|r| r.status == RequestStatus::Completed).count(),
            1
        );
    }
}
