use crate::error::TypeError;
use crate::record::RecordId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of an appointment, as carried in its `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal statuses mark the record immutable: a reschedule gesture
    /// on one of these must be rejected before any network round-trip.
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl FromStr for AppointmentStatus {
    type Err = TypeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Backend-computed candidate reschedule times for one resource and date.
///
/// A proposal is produced by a single availability query and consumed
/// exactly once by the user's selection, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotProposal {
    pub resource_id: RecordId,
    pub date: NaiveDate,
    pub candidate_times: Vec<NaiveTime>,
}

impl SlotProposal {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.candidate_times.contains(&time)
    }

    pub fn is_empty(&self) -> bool {
        self.candidate_times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!(
            "Scheduled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Scheduled
        );
        assert_eq!(
            "CANCELLED".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!("unknown".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_only_completed_and_cancelled_are_terminal() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(!AppointmentStatus::Confirmed.is_terminal());
        assert!(!AppointmentStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_proposal_deserialises_from_wire_json() {
        let proposal: SlotProposal = serde_json::from_value(serde_json::json!({
            "resource_id": "3",
            "date": "2026-08-24",
            "candidate_times": ["09:00:00", "09:30:00"],
        }))
        .unwrap();
        assert_eq!(proposal.resource_id.as_str(), "3");
        assert_eq!(proposal.candidate_times.len(), 2);
    }

    #[test]
    fn test_proposal_membership() {
        let proposal = SlotProposal {
            resource_id: RecordId::from(3),
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            candidate_times: vec![
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ],
        };
        assert!(proposal.contains(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
        assert!(!proposal.contains(NaiveTime::from_hms_opt(10, 0, 0).unwrap()));
        assert!(!proposal.is_empty());
    }
}
