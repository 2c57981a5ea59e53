//! # medoffice-client
//!
//! Remote resource access for the medoffice administrative client.
//!
//! One [`RestClient`] wraps a single backend collection endpoint
//! (`GET /{resource}/?page=…`, `POST /{resource}/`, …), translating list
//! queries into request parameters, unwrapping paginated envelopes and
//! classifying every failure into the [`ApiError`] taxonomy. The
//! [`ScheduleClient`] adds the two calls the rescheduling flow needs.
//!
//! There is no caching layer and no automatic retry: a call is one
//! network round-trip, and errors pass upward unchanged.
//!
//! [`ApiError`]: medoffice_types::ApiError

pub mod gateway;
pub mod rest;

pub use gateway::{ResourceApi, ScheduleApi};
pub use rest::{ApiConnection, RestClient, ScheduleClient};
