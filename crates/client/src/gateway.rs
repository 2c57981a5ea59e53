//! Trait seams between controllers and the network.
//!
//! Controllers are generic over these traits so their state machines can
//! be exercised against in-memory fakes; `rest` provides the production
//! implementations.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use medoffice_types::{ApiResult, FieldMap, ListQuery, Page, Record, RecordId, SlotProposal};

/// Single-collection REST access.
///
/// Payloads are partial field maps; the client does not validate field
/// presence — that is the form's responsibility before invocation.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Fetches one page for the query. The query's page index must be >= 1.
    async fn list(&self, query: &ListQuery) -> ApiResult<Page>;

    /// Fetches the **full** result set for the query's filters, search and
    /// ordering, ignoring its page window. Backs export, which must
    /// reflect all matching records independent of the visible page.
    async fn list_all(&self, query: &ListQuery) -> ApiResult<Vec<Record>>;

    async fn get(&self, id: &RecordId) -> ApiResult<Record>;

    async fn create(&self, payload: &FieldMap) -> ApiResult<Record>;

    async fn update(&self, id: &RecordId, payload: &FieldMap) -> ApiResult<Record>;

    /// Deletes one record. A repeated delete on an already-deleted id
    /// surfaces `NotFound`, which callers treat as already-satisfied.
    async fn delete(&self, id: &RecordId) -> ApiResult<()>;
}

/// The two backend calls of the slot rescheduling flow.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    /// Asks the backend for candidate times on `date` for `resource_id`.
    async fn slot_proposal(&self, resource_id: &RecordId, date: NaiveDate)
        -> ApiResult<SlotProposal>;

    /// Commits a reschedule to the chosen slot, returning the updated
    /// appointment record. Fails with `Validation` when the slot was
    /// taken in the interim.
    async fn commit_reschedule(
        &self,
        appointment_id: &RecordId,
        resource_id: &RecordId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> ApiResult<Record>;
}
