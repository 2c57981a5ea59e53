//! The slot rescheduling flow.
//!
//! Moving an appointment is a three step negotiation: a drop gesture
//! names the target doctor and day, the backend answers with the free
//! slots of that day, and the user picks one of them. Nothing is
//! written until the final pick; every abort before that point only
//! needs the view to snap the dragged card back to where it was, which
//! is what the `revert_pending` flag tells the render layer to do.

use crate::error::{ControllerError, ControllerResult};
use crate::notify::Notifications;
use chrono::{NaiveDate, NaiveTime};
use medoffice_client::ScheduleApi;
use medoffice_types::{AppointmentStatus, Record, RecordId, SlotProposal};

/// A completed drag of an appointment card onto a doctor/day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    pub appointment_id: RecordId,
    pub target_resource: RecordId,
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReschedulePhase {
    Idle,
    AwaitingSlots,
    PresentingChoices,
    Committing,
}

enum FlowState {
    Idle,
    AwaitingSlots {
        gesture: DragGesture,
    },
    Presenting {
        gesture: DragGesture,
        proposal: SlotProposal,
    },
    Committing,
}

pub struct RescheduleController {
    state: FlowState,
    revert_pending: bool,
    notices: Notifications,
}

impl Default for RescheduleController {
    fn default() -> Self {
        Self::new()
    }
}

impl RescheduleController {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            revert_pending: false,
            notices: Notifications::new(),
        }
    }

    pub fn phase(&self) -> ReschedulePhase {
        match self.state {
            FlowState::Idle => ReschedulePhase::Idle,
            FlowState::AwaitingSlots { .. } => ReschedulePhase::AwaitingSlots,
            FlowState::Presenting { .. } => ReschedulePhase::PresentingChoices,
            FlowState::Committing => ReschedulePhase::Committing,
        }
    }

    /// The slot choices currently offered, if any.
    pub fn proposal(&self) -> Option<&SlotProposal> {
        match &self.state {
            FlowState::Presenting { proposal, .. } => Some(proposal),
            _ => None,
        }
    }

    /// Consumes the revert flag. The render layer polls this after each
    /// controller call and snaps the dragged card back when it is set.
    pub fn take_pending_revert(&mut self) -> bool {
        std::mem::take(&mut self.revert_pending)
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    /// Handles a drop gesture: rejects terminal appointments without a
    /// network call, otherwise asks the backend for the free slots of
    /// the target doctor/day. A new gesture while one is already in
    /// flight simply replaces it; the older fetch is abandoned.
    pub async fn begin<A: ScheduleApi>(
        &mut self,
        api: &A,
        record: &Record,
        target_resource: RecordId,
        target_date: NaiveDate,
    ) -> ControllerResult<()> {
        // Unknown status strings are treated as mutable; only a status
        // this client recognises as terminal blocks the flow.
        if let Some(status) = record
            .status()
            .and_then(|raw| raw.parse::<AppointmentStatus>().ok())
        {
            if status.is_terminal() {
                return Err(ControllerError::ImmutableAppointment { status });
            }
        }
        let gesture = DragGesture {
            appointment_id: record.id().clone(),
            target_resource,
            target_date,
        };
        self.state = FlowState::AwaitingSlots {
            gesture: gesture.clone(),
        };

        match api.slot_proposal(&gesture.target_resource, gesture.target_date).await {
            Ok(proposal) => {
                self.state = FlowState::Presenting { gesture, proposal };
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "slot proposal fetch failed");
                self.state = FlowState::Idle;
                self.revert_pending = true;
                self.notices
                    .push_error(format!("could not fetch free slots: {error}"));
                Err(error.into())
            }
        }
    }

    /// Abandons the offered choices and flags the card for revert.
    pub fn cancel(&mut self) -> ControllerResult<()> {
        match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::Presenting { .. } => {
                self.revert_pending = true;
                Ok(())
            }
            other => {
                self.state = other;
                Err(ControllerError::NoPendingProposal)
            }
        }
    }

    /// Commits the chosen slot. Only now is anything written: the
    /// appointment moves to the gesture's doctor and date at `time`.
    /// A time outside the proposal is rejected and the choices remain
    /// on offer.
    pub async fn commit<A: ScheduleApi>(
        &mut self,
        api: &A,
        time: NaiveTime,
    ) -> ControllerResult<Record> {
        match &self.state {
            FlowState::Presenting { proposal, .. } => {
                if !proposal.contains(time) {
                    return Err(ControllerError::TimeNotProposed(time));
                }
            }
            _ => return Err(ControllerError::NoPendingProposal),
        }
        let gesture = match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::Presenting { gesture, .. } => gesture,
            // Unreachable: the match above returned for every other arm.
            _ => return Err(ControllerError::NoPendingProposal),
        };
        self.state = FlowState::Committing;

        let outcome = api
            .commit_reschedule(
                &gesture.appointment_id,
                &gesture.target_resource,
                gesture.target_date,
                time,
            )
            .await;
        self.state = FlowState::Idle;

        match outcome {
            Ok(record) => {
                self.notices.push_success(format!(
                    "appointment {} moved to {} {}",
                    gesture.appointment_id, gesture.target_date, time
                ));
                Ok(record)
            }
            Err(error) => {
                tracing::warn!(%error, "reschedule commit failed");
                self.revert_pending = true;
                self.notices
                    .push_error(format!("reschedule failed: {error}"));
                Err(error.into())
            }
        }
    }
}
