//! The paginated resource list controller.
//!
//! One controller instance owns the view state of one collection screen:
//! the effective query (filters, search, page window, ordering), the
//! current page cache and the load/failure phase. The backend stays
//! authoritative; the page is replaced wholesale on every load and
//! mutated locally only by the optimistic delete path.
//!
//! The async suspension points are explicit: `begin_load` snapshots the
//! query into a [`LoadTicket`] and `finish_load` applies the outcome only
//! if no state change happened in between. Calls can therefore resolve
//! in any order without a stale response ever reaching the view, which
//! is exactly the interleaving model of an event-loop UI.

use crate::descriptor::ViewDescriptor;
use crate::error::{ControllerError, ControllerResult};
use crate::notify::Notifications;
use chrono::NaiveDate;
use medoffice_client::ResourceApi;
use medoffice_export::{export, ExportFile, ExportFormat, TabularDocument};
use medoffice_types::{ApiResult, ListQuery, Page, RecordId};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Snapshot of one in-flight list fetch.
///
/// The ticket pins the query that was actually sent and the controller
/// generation at send time; `finish_load` discards any outcome whose
/// generation no longer matches.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    query: ListQuery,
}

impl LoadTicket {
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

pub struct ListController {
    descriptor: ViewDescriptor,
    query: ListQuery,
    phase: ListPhase,
    page: Option<Page>,
    last_error: Option<medoffice_types::ApiError>,
    generation: u64,
    pending: HashSet<RecordId>,
    notices: Notifications,
}

impl ListController {
    pub fn new(descriptor: ViewDescriptor) -> Self {
        let mut query = ListQuery::new(descriptor.page_size);
        query.ordering = descriptor.default_ordering.clone();
        Self {
            descriptor,
            query,
            phase: ListPhase::Idle,
            page: None,
            last_error: None,
            generation: 0,
            pending: HashSet::new(),
            notices: Notifications::new(),
        }
    }

    pub fn descriptor(&self) -> &ViewDescriptor {
        &self.descriptor
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn last_error(&self) -> Option<&medoffice_types::ApiError> {
        self.last_error.as_ref()
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    /// Enters `Loading` and hands out the ticket for the fetch that must
    /// follow. Every call invalidates all earlier tickets.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = ListPhase::Loading;
        LoadTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Applies a fetch outcome, unless the controller state moved on
    /// while the request was in flight. Returns whether the outcome was
    /// applied; a stale outcome is discarded without touching the view.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: ApiResult<Page>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                view = %self.descriptor.slug,
                "discarding stale list response"
            );
            return false;
        }
        match outcome {
            Ok(page) => {
                self.page = Some(page);
                self.phase = ListPhase::Loaded;
                self.last_error = None;
            }
            Err(error) => {
                tracing::warn!(view = %self.descriptor.slug, %error, "list fetch failed");
                self.phase = ListPhase::Failed;
                self.last_error = Some(error);
            }
        }
        true
    }

    /// Merges a filter patch (empty values clear their entry), resets to
    /// page 1 and re-enters `Loading`.
    pub fn apply_filter(
        &mut self,
        patch: impl IntoIterator<Item = (String, String)>,
    ) -> LoadTicket {
        self.query.filters.merge(patch);
        self.query.page_index = 1;
        self.begin_load()
    }

    /// Sets the free-text search term; behaves like a filter change.
    pub fn set_search(&mut self, term: impl Into<String>) -> LoadTicket {
        self.query.set_search(term);
        self.query.page_index = 1;
        self.begin_load()
    }

    /// Moves to page `n`, keeping the filter set. Out-of-range targets
    /// are rejected without touching any state.
    pub fn change_page(&mut self, n: u32) -> ControllerResult<LoadTicket> {
        let last = match self.page.as_ref() {
            Some(page) => page.total_pages(),
            // Nothing loaded yet: only the first page is addressable.
            None => 1,
        };
        if n < 1 || n > last {
            return Err(ControllerError::PageOutOfRange { requested: n, last });
        }
        self.query.page_index = n;
        Ok(self.begin_load())
    }

    /// Runs one fetch for `ticket` and applies the outcome. The fetch
    /// error is surfaced only when the outcome was actually applied.
    pub async fn load<A: ResourceApi>(
        &mut self,
        api: &A,
        ticket: LoadTicket,
    ) -> ControllerResult<()> {
        let outcome = api.list(ticket.query()).await;
        let error = outcome.as_ref().err().cloned();
        let applied = self.finish_load(ticket, outcome);
        match error {
            Some(e) if applied => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// `begin_load` + `load` in one step: the plain refresh.
    pub async fn refresh<A: ResourceApi>(&mut self, api: &A) -> ControllerResult<()> {
        let ticket = self.begin_load();
        self.load(api, ticket).await
    }

    /// Optimistic delete.
    ///
    /// The row is removed and the count decremented before the backend
    /// call; on failure the exact pre-delete snapshot is restored (never
    /// a refetch, which could race a concurrent load). A delete of an
    /// already-deleted record counts as satisfied. Both the optimistic
    /// removal and a rollback invalidate in-flight list responses, so a
    /// racing page fetch cannot resurrect the deleted row.
    pub async fn remove<A: ResourceApi>(
        &mut self,
        api: &A,
        id: &RecordId,
    ) -> ControllerResult<()> {
        if self.pending.contains(id) {
            return Err(ControllerError::MutationPending(id.clone()));
        }
        let page = self.page.as_mut().ok_or(ControllerError::NoPageLoaded)?;
        let index = page
            .items
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| ControllerError::RecordNotOnPage(id.clone()))?;

        let snapshot_items = page.items.clone();
        let snapshot_total = page.total_count;
        page.items.remove(index);
        page.total_count = page.total_count.saturating_sub(1);
        self.generation += 1;

        self.pending.insert(id.clone());
        let outcome = api.delete(id).await;
        self.pending.remove(id);

        match outcome {
            Ok(()) => {
                self.notices.push_success(format!("record {id} deleted"));
                Ok(())
            }
            Err(error) if error.is_not_found() => {
                // Already gone server-side; the optimistic removal stands.
                self.notices.push_success(format!("record {id} deleted"));
                Ok(())
            }
            Err(error) => {
                if let Some(page) = self.page.as_mut() {
                    page.items = snapshot_items;
                    page.total_count = snapshot_total;
                }
                self.generation += 1;
                self.notices.push_error(format!("failed to delete record {id}: {error}"));
                Err(error.into())
            }
        }
    }

    /// Exports everything matching the current filter set, across all
    /// pages, never just the visible page. A failure aborts the export
    /// and leaves the view state untouched.
    pub async fn export_current_view<A: ResourceApi>(
        &mut self,
        api: &A,
        format: ExportFormat,
        today: NaiveDate,
    ) -> ControllerResult<ExportFile> {
        let records = api.list_all(&self.query).await?;
        let document = TabularDocument::from_records(&records, &self.descriptor.columns)?;
        let file = export(
            &document,
            format,
            &self.descriptor.slug,
            &self.descriptor.title,
            today,
        )?;
        self.notices.push_success(format!(
            "exported {} records to {}",
            records.len(),
            file.name
        ));
        Ok(file)
    }

    #[cfg(test)]
    pub(crate) fn mark_pending(&mut self, id: RecordId) {
        self.pending.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::find_view;
    use async_trait::async_trait;
    use medoffice_types::{ApiError, FieldMap, Record};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn record(id: i64) -> Record {
        Record::from_value(json!({
            "id": id,
            "created_at": format!("2026-08-{:02}", (id % 28) + 1),
            "file": format!("backup-{id}.dump"),
            "size": "12MB",
            "status": "ok",
        }))
        .unwrap()
    }

    fn page(ids: std::ops::RangeInclusive<i64>, total: u64, index: u32) -> Page {
        Page::new(ids.map(record).collect(), total, index, 10).unwrap()
    }

    #[derive(Default)]
    struct FakeApi {
        list_results: Mutex<VecDeque<ApiResult<Page>>>,
        delete_results: Mutex<VecDeque<ApiResult<()>>>,
        all_results: Mutex<VecDeque<ApiResult<Vec<Record>>>>,
    }

    impl FakeApi {
        fn queue_list(&self, result: ApiResult<Page>) {
            self.list_results.lock().unwrap().push_back(result);
        }
        fn queue_delete(&self, result: ApiResult<()>) {
            self.delete_results.lock().unwrap().push_back(result);
        }
        fn queue_all(&self, result: ApiResult<Vec<Record>>) {
            self.all_results.lock().unwrap().push_back(result);
        }
    }

    #[async_trait]
    impl ResourceApi for FakeApi {
        async fn list(&self, _query: &ListQuery) -> ApiResult<Page> {
            self.list_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no queued list result".into())))
        }
        async fn list_all(&self, _query: &ListQuery) -> ApiResult<Vec<Record>> {
            self.all_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no queued list_all result".into())))
        }
        async fn get(&self, _id: &RecordId) -> ApiResult<Record> {
            Err(ApiError::NotFound)
        }
        async fn create(&self, _payload: &FieldMap) -> ApiResult<Record> {
            Err(ApiError::Network("unused".into()))
        }
        async fn update(&self, _id: &RecordId, _payload: &FieldMap) -> ApiResult<Record> {
            Err(ApiError::Network("unused".into()))
        }
        async fn delete(&self, _id: &RecordId) -> ApiResult<()> {
            self.delete_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no queued delete result".into())))
        }
    }

    fn controller() -> ListController {
        ListController::new(find_view("backups").unwrap())
    }

    #[tokio::test]
    async fn test_twelve_backups_paginate_as_ten_plus_two() {
        let api = FakeApi::default();
        let mut ctl = controller();
        assert_eq!(ctl.phase(), ListPhase::Idle);

        api.queue_list(Ok(page(1..=10, 12, 1)));
        ctl.refresh(&api).await.unwrap();
        assert_eq!(ctl.phase(), ListPhase::Loaded);
        let first = ctl.page().unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_count, 12);
        assert_eq!(first.total_pages(), 2);

        api.queue_list(Ok(page(11..=12, 12, 2)));
        let ticket = ctl.change_page(2).unwrap();
        assert_eq!(ctl.phase(), ListPhase::Loading);
        ctl.load(&api, ticket).await.unwrap();
        assert_eq!(ctl.page().unwrap().items.len(), 2);
        assert!(ctl.page().unwrap().is_last());
    }

    #[tokio::test]
    async fn test_change_page_rejects_out_of_range_targets() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=10, 12, 1)));
        ctl.refresh(&api).await.unwrap();

        assert!(matches!(
            ctl.change_page(0),
            Err(ControllerError::PageOutOfRange { requested: 0, last: 2 })
        ));
        assert!(matches!(
            ctl.change_page(3),
            Err(ControllerError::PageOutOfRange { requested: 3, last: 2 })
        ));
        // The rejection is a no-op: still Loaded on page 1.
        assert_eq!(ctl.phase(), ListPhase::Loaded);
        assert_eq!(ctl.query().page_index, 1);
    }

    #[tokio::test]
    async fn test_apply_filter_resets_to_page_one() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=10, 25, 1)));
        ctl.refresh(&api).await.unwrap();
        api.queue_list(Ok(page(11..=20, 25, 2)));
        let ticket = ctl.change_page(2).unwrap();
        ctl.load(&api, ticket).await.unwrap();
        assert_eq!(ctl.query().page_index, 2);

        let ticket = ctl.apply_filter(vec![("status".to_string(), "failed".to_string())]);
        assert_eq!(ticket.query().page_index, 1);
        assert_eq!(ticket.query().filters.get("status"), Some("failed"));
        assert_eq!(ctl.phase(), ListPhase::Loading);
    }

    #[tokio::test]
    async fn test_failed_load_surfaces_error_and_phase() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Err(ApiError::Auth { status: 401 }));
        let err = ctl.refresh(&api).await.unwrap_err();
        assert!(matches!(err, ControllerError::Api(ApiError::Auth { status: 401 })));
        assert_eq!(ctl.phase(), ListPhase::Failed);
        assert_eq!(ctl.last_error(), Some(&ApiError::Auth { status: 401 }));
    }

    #[tokio::test]
    async fn test_stale_response_is_never_applied() {
        let mut ctl = controller();

        // A fetch for filter set A goes out...
        let ticket_a = ctl.begin_load();
        // ...but the user changes the filters to B before A resolves.
        let ticket_b = ctl.apply_filter(vec![("status".to_string(), "failed".to_string())]);

        // A's response arrives late and must be discarded on arrival.
        let applied = ctl.finish_load(ticket_a, Ok(page(1..=10, 25, 1)));
        assert!(!applied);
        assert!(ctl.page().is_none());
        assert_eq!(ctl.phase(), ListPhase::Loading);

        // B's response applies normally.
        assert!(ctl.finish_load(ticket_b, Ok(page(1..=3, 3, 1))));
        assert_eq!(ctl.phase(), ListPhase::Loaded);
        assert_eq!(ctl.page().unwrap().items.len(), 3);
    }

    #[tokio::test]
    async fn test_optimistic_delete_rolls_back_exactly_on_server_error() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=5, 5, 1)));
        ctl.refresh(&api).await.unwrap();

        let before = ctl.page().unwrap().clone();
        api.queue_delete(Err(ApiError::Server {
            status: 500,
            message: "boom".into(),
        }));

        let err = ctl.remove(&api, &RecordId::from(3)).await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Api(ApiError::Server { status: 500, .. })
        ));

        // Identical items (id 3 back at its original index) and count.
        let after = ctl.page().unwrap();
        assert_eq!(after.items, before.items);
        assert_eq!(after.total_count, before.total_count);
        assert_eq!(after.items[2].id().as_str(), "3");
    }

    #[tokio::test]
    async fn test_delete_applies_optimistically_on_success() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=5, 5, 1)));
        ctl.refresh(&api).await.unwrap();

        api.queue_delete(Ok(()));
        ctl.remove(&api, &RecordId::from(2)).await.unwrap();

        let page = ctl.page().unwrap();
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.total_count, 4);
        assert!(page.items.iter().all(|r| r.id().as_str() != "2"));
        let notices = ctl.notices_mut().drain();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("deleted"));
    }

    #[tokio::test]
    async fn test_delete_of_already_deleted_record_is_satisfied() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=5, 5, 1)));
        ctl.refresh(&api).await.unwrap();

        api.queue_delete(Err(ApiError::NotFound));
        // No user-facing error: the record is simply gone.
        ctl.remove(&api, &RecordId::from(2)).await.unwrap();
        assert_eq!(ctl.page().unwrap().items.len(), 4);
    }

    #[tokio::test]
    async fn test_double_submit_per_record_is_rejected() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=5, 5, 1)));
        ctl.refresh(&api).await.unwrap();

        ctl.mark_pending(RecordId::from(3));
        let err = ctl.remove(&api, &RecordId::from(3)).await.unwrap_err();
        assert!(matches!(err, ControllerError::MutationPending(_)));
        // The guarded record is untouched.
        assert_eq!(ctl.page().unwrap().items.len(), 5);
    }

    #[tokio::test]
    async fn test_page_change_landing_after_delete_cannot_resurrect_the_row() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=5, 5, 1)));
        ctl.refresh(&api).await.unwrap();

        // A refresh goes out, holding a response that still contains id 3.
        let stale_ticket = ctl.begin_load();

        // The delete lands first.
        api.queue_delete(Ok(()));
        ctl.remove(&api, &RecordId::from(3)).await.unwrap();

        // The older list response arrives afterwards and is discarded.
        let applied = ctl.finish_load(stale_ticket, Ok(page(1..=5, 5, 1)));
        assert!(!applied);
        assert!(ctl
            .page()
            .unwrap()
            .items
            .iter()
            .all(|r| r.id().as_str() != "3"));
    }

    #[tokio::test]
    async fn test_hung_request_leaves_the_view_loading() {
        // No timeout exists at this layer: with no response, the view
        // stays in Loading indefinitely. Known limitation.
        let mut ctl = controller();
        let _ticket = ctl.begin_load();
        assert_eq!(ctl.phase(), ListPhase::Loading);
    }

    #[tokio::test]
    async fn test_export_covers_every_matching_record_not_just_the_page() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=10, 25, 1)));
        ctl.refresh(&api).await.unwrap();

        // 25 matching records across 3 pages.
        api.queue_all(Ok((1..=25).map(record).collect()));
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let file = ctl
            .export_current_view(&api, ExportFormat::Spreadsheet, today)
            .await
            .unwrap();

        assert_eq!(file.name, "backups_2026-08-23.csv");
        let text = String::from_utf8(file.bytes).unwrap();
        // Header plus 25 data rows.
        assert_eq!(text.lines().count(), 26);
    }

    #[tokio::test]
    async fn test_failed_export_leaves_view_state_untouched() {
        let api = FakeApi::default();
        let mut ctl = controller();
        api.queue_list(Ok(page(1..=10, 25, 1)));
        ctl.refresh(&api).await.unwrap();

        api.queue_all(Ok(Vec::new()));
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let err = ctl
            .export_current_view(&api, ExportFormat::Html, today)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Export(medoffice_export::ExportError::Empty)
        ));
        assert_eq!(ctl.phase(), ListPhase::Loaded);
        assert_eq!(ctl.page().unwrap().items.len(), 10);
    }
}
