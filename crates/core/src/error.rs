use chrono::NaiveTime;
use medoffice_export::ExportError;
use medoffice_types::{ApiError, AppointmentStatus, RecordId};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("a mutation is already pending for record {0}")]
    MutationPending(RecordId),
    #[error("no page is loaded yet")]
    NoPageLoaded,
    #[error("record {0} is not on the current page")]
    RecordNotOnPage(RecordId),
    #[error("page {requested} is out of range (valid: 1..={last})")]
    PageOutOfRange { requested: u32, last: u32 },
    #[error("appointment is {status} and can no longer be rescheduled")]
    ImmutableAppointment { status: AppointmentStatus },
    #[error("no slot proposal is awaiting a choice")]
    NoPendingProposal,
    #[error("{0} is not one of the proposed slot times")]
    TimeNotProposed(NaiveTime),
    #[error("unknown view {0:?}")]
    UnknownView(String),
}

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;
