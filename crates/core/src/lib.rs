//! # medoffice-core
//!
//! Controller logic for the medoffice administrative client.
//!
//! This crate owns the view-side state machines:
//! - [`ListController`]: paged/filtered collection views with optimistic
//!   delete, stale-response discard and full-result export
//! - [`RescheduleController`]: the calendar drag flow (slot proposal →
//!   choice → commit, with visual revert on every failure edge)
//! - [`ViewDescriptor`]: declarative per-entity view configuration
//! - [`Notifications`]: the toast queue drained by the render layer
//!
//! **No transport concerns**: controllers talk to the backend only
//! through the gateway traits of `medoffice-client`, so every state
//! transition can be exercised against in-memory fakes.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod list;
pub mod notify;
pub mod reschedule;

pub use config::AppConfig;
pub use descriptor::{builtin_views, find_view, FilterField, ViewDescriptor};
pub use error::{ControllerError, ControllerResult};
pub use list::{ListController, ListPhase, LoadTicket};
pub use notify::{Notice, NoticeLevel, Notifications};
pub use reschedule::{DragGesture, ReschedulePhase, RescheduleController};
