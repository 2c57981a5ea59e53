//! # medoffice-types
//!
//! Shared value types for the medoffice administrative client:
//!
//! - Opaque backend [`Record`]s and their stable identifiers
//! - [`Page`] slices of a collection plus pagination metadata
//! - [`FilterSet`]/[`ListQuery`] for the effective list query
//! - [`SlotProposal`] and appointment status for the rescheduling flow
//! - The [`ApiError`] taxonomy every layer above speaks
//!
//! **No transport concerns**: HTTP, envelopes and classification of raw
//! transport failures belong in `medoffice-client`.

pub mod error;
pub mod filter;
pub mod page;
pub mod record;
pub mod resource;
pub mod schedule;

pub use error::{ApiError, ApiResult, TypeError};
pub use filter::{FilterSet, ListQuery, OrderingKey};
pub use page::Page;
pub use record::{FieldMap, Record, RecordId, MISSING_VALUE};
pub use resource::CollectionName;
pub use schedule::{AppointmentStatus, SlotProposal};
