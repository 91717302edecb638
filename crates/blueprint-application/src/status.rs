//! Phase, busy flag and progress bookkeeping shared by both flows.
//!
//! Every assistant call runs under an [`InFlight`] guard. If the call's
//! future is dropped before it settles (a timeout, a `select!` branch that
//! lost), the guard puts the flow back in the phase it started from and
//! clears the busy flag, so the flow never stays locked.

use std::fmt;

use crate::events::{EventBus, FlowKind, WizardEvent};

/// Bounds shared by the per-flow phase enums.
pub(crate) trait Phase: Copy + PartialEq + fmt::Display {}

impl<T: Copy + PartialEq + fmt::Display> Phase for T {}

pub(crate) struct FlowStatus<P: Phase> {
    flow: FlowKind,
    phase: P,
    busy: bool,
    progress: Option<String>,
    events: EventBus,
}

impl<P: Phase> FlowStatus<P> {
    pub(crate) fn new(flow: FlowKind, phase: P) -> Self {
        Self {
            flow,
            phase,
            busy: false,
            progress: None,
            events: EventBus::new(),
        }
    }

    pub(crate) fn phase(&self) -> P {
        self.phase
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn progress(&self) -> Option<&str> {
        self.progress.as_deref()
    }

    pub(crate) fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub(crate) fn publish(&mut self, event: WizardEvent) {
        self.events.publish(event);
    }

    pub(crate) fn set_phase(&mut self, phase: P) {
        self.phase = phase;
        self.events.publish(WizardEvent::PhaseChanged {
            flow: self.flow,
            phase: phase.to_string(),
        });
    }

    pub(crate) fn set_progress(&mut self, label: &str) {
        self.progress = Some(label.to_string());
        self.events.publish(WizardEvent::Progress {
            label: label.to_string(),
        });
    }

    /// Marks the flow busy for one assistant call, moving to `during` first
    /// when it differs from the current phase.
    pub(crate) fn begin(&mut self, during: P) -> InFlight<'_, P> {
        let revert_to = self.phase;
        if during != self.phase {
            self.set_phase(during);
        }
        self.set_busy(true);
        InFlight {
            status: self,
            revert_to,
            settled: false,
        }
    }

    fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.events.publish(WizardEvent::BusyChanged {
                flow: self.flow,
                busy,
            });
        }
    }
}

/// Held across the `.await` of an assistant call.
pub(crate) struct InFlight<'a, P: Phase> {
    status: &'a mut FlowStatus<P>,
    revert_to: P,
    settled: bool,
}

impl<P: Phase> InFlight<'_, P> {
    pub(crate) fn status(&mut self) -> &mut FlowStatus<P> {
        self.status
    }

    /// The call finished (successfully or not). Clears busy and progress and
    /// leaves the phase for the caller to decide.
    pub(crate) fn settle(mut self) {
        self.settled = true;
        self.status.progress = None;
        self.status.set_busy(false);
    }
}

impl<P: Phase> Drop for InFlight<'_, P> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!(
            "[{:?}] Call abandoned in phase '{}', reverting to '{}'",
            self.status.flow,
            self.status.phase,
            self.revert_to
        );
        self.status.progress = None;
        if self.status.phase != self.revert_to {
            self.status.set_phase(self.revert_to);
        }
        self.status.set_busy(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Step {
        Open,
        Working,
    }

    impl fmt::Display for Step {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[test]
    fn test_dropped_guard_reverts_phase_and_busy() {
        let mut status = FlowStatus::new(FlowKind::Consultation, Step::Open);
        {
            let mut call = status.begin(Step::Working);
            call.status().set_progress("halfway");
        }

        assert_eq!(status.phase(), Step::Open);
        assert!(!status.is_busy());
        assert!(status.progress().is_none());
    }

    #[test]
    fn test_settled_guard_keeps_phase() {
        let mut status = FlowStatus::new(FlowKind::Design, Step::Open);
        let call = status.begin(Step::Working);
        call.settle();

        assert_eq!(status.phase(), Step::Working);
        assert!(!status.is_busy());
    }
}
