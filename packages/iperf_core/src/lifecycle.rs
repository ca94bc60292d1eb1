//! Idle/Running lifecycle per traffic type, kept by the task that delivers
//! session events. The hook itself stays stateless; this only records what the
//! engine reported and flags boundaries that arrive out of order.

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    hook::SessionHook,
    session::{SessionEvent, SessionStatus, TrafficType},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecycleNote {
    Began,
    Ended,
    /// Started arrived while the previous session of that type never stopped.
    RestartedWhileRunning,
    /// Stopped arrived with no session of that type running.
    StopWithoutStart,
    #[default]
    Ignored,
}

impl LifecycleNote {
    pub const fn is_anomaly(self) -> bool {
        matches!(self, Self::RestartedWhileRunning | Self::StopWithoutStart)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TransitionContext {
    note: LifecycleNote,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SessionMachine {
    phase: SessionPhase,
    started: u32,
    completed: u32,
}

#[state_machine(initial = "State::idle()")]
impl SessionMachine {
    #[state]
    fn idle(&mut self, context: &mut TransitionContext, event: &SessionStatus) -> Outcome<State> {
        match event {
            SessionStatus::Started => {
                self.started = self.started.wrapping_add(1);
                self.phase = SessionPhase::Running;
                context.note = LifecycleNote::Began;
                Transition(State::running())
            }
            SessionStatus::Stopped => {
                context.note = LifecycleNote::StopWithoutStart;
                Handled
            }
            SessionStatus::Other(_) => {
                context.note = LifecycleNote::Ignored;
                Handled
            }
        }
    }

    #[state]
    fn running(
        &mut self,
        context: &mut TransitionContext,
        event: &SessionStatus,
    ) -> Outcome<State> {
        match event {
            SessionStatus::Started => {
                self.started = self.started.wrapping_add(1);
                context.note = LifecycleNote::RestartedWhileRunning;
                Handled
            }
            SessionStatus::Stopped => {
                self.completed = self.completed.wrapping_add(1);
                self.phase = SessionPhase::Idle;
                context.note = LifecycleNote::Ended;
                Transition(State::idle())
            }
            SessionStatus::Other(_) => {
                context.note = LifecycleNote::Ignored;
                Handled
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub started: u32,
    pub completed: u32,
}

pub struct SessionTracker {
    machines: [statig::blocking::StateMachine<SessionMachine>; 4],
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            machines: core::array::from_fn(|_| SessionMachine::default().state_machine()),
        }
    }

    /// Events for traffic types this build does not know are never tracked.
    pub fn observe(&mut self, event: SessionEvent) -> LifecycleNote {
        let Some(slot) = event.traffic.slot() else {
            return LifecycleNote::Ignored;
        };
        let mut context = TransitionContext::default();
        self.machines[slot].handle_with_context(&event.status, &mut context);
        context.note
    }

    pub fn phase(&self, traffic: TrafficType) -> SessionPhase {
        traffic
            .slot()
            .map(|slot| self.machines[slot].inner().phase)
            .unwrap_or_default()
    }

    pub fn counts(&self, traffic: TrafficType) -> SessionCounts {
        traffic
            .slot()
            .map(|slot| {
                let inner = self.machines[slot].inner();
                SessionCounts {
                    started: inner.started,
                    completed: inner.completed,
                }
            })
            .unwrap_or_default()
    }

    pub fn any_running(&self) -> bool {
        TrafficType::ALL
            .iter()
            .any(|traffic| self.phase(*traffic) == SessionPhase::Running)
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub note: LifecycleNote,
    /// `false` when no hook was registered and the event went nowhere.
    pub hooked: bool,
}

/// Records one engine-reported boundary, then hands it to the registered
/// hook. Out-of-order boundaries are logged and still delivered.
pub fn deliver_session_event(
    tracker: &mut SessionTracker,
    hook: Option<&dyn SessionHook>,
    event: SessionEvent,
) -> Delivery {
    let note = tracker.observe(event);
    if note.is_anomaly() {
        log::warn!("session: {:?} on {:?}", note, event);
    } else {
        log::debug!("session: {:?} on {:?}", note, event);
    }

    let hooked = match hook {
        Some(hook) => {
            hook.on_session_event(event);
            true
        }
        None => {
            log::warn!("session: no hook registered, dropping {:?}", event);
            false
        }
    };
    Delivery { note, hooked }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, vec, vec::Vec};

    use super::*;

    #[derive(Default)]
    struct RecordingHook {
        seen: Mutex<Vec<SessionEvent>>,
    }

    impl SessionHook for RecordingHook {
        fn on_session_event(&self, event: SessionEvent) {
            self.seen.lock().unwrap().push(event);
        }
    }

    #[test]
    fn start_then_stop_returns_to_idle() {
        let mut tracker = SessionTracker::new();
        assert_eq!(tracker.phase(TrafficType::TcpClient), SessionPhase::Idle);

        let began = tracker.observe(SessionEvent::started(TrafficType::TcpClient));
        assert_eq!(began, LifecycleNote::Began);
        assert_eq!(tracker.phase(TrafficType::TcpClient), SessionPhase::Running);
        assert!(tracker.any_running());

        let ended = tracker.observe(SessionEvent::stopped(TrafficType::TcpClient));
        assert_eq!(ended, LifecycleNote::Ended);
        assert_eq!(tracker.phase(TrafficType::TcpClient), SessionPhase::Idle);
        assert_eq!(
            tracker.counts(TrafficType::TcpClient),
            SessionCounts {
                started: 1,
                completed: 1
            }
        );
    }

    #[test]
    fn traffic_types_are_tracked_independently() {
        let mut tracker = SessionTracker::new();
        tracker.observe(SessionEvent::started(TrafficType::UdpServer));
        assert_eq!(tracker.phase(TrafficType::UdpServer), SessionPhase::Running);
        assert_eq!(tracker.phase(TrafficType::UdpClient), SessionPhase::Idle);
    }

    #[test]
    fn out_of_order_boundaries_are_flagged() {
        let mut tracker = SessionTracker::new();
        let stray = tracker.observe(SessionEvent::stopped(TrafficType::TcpServer));
        assert_eq!(stray, LifecycleNote::StopWithoutStart);
        assert!(stray.is_anomaly());
        assert_eq!(tracker.phase(TrafficType::TcpServer), SessionPhase::Idle);

        tracker.observe(SessionEvent::started(TrafficType::TcpServer));
        let again = tracker.observe(SessionEvent::started(TrafficType::TcpServer));
        assert_eq!(again, LifecycleNote::RestartedWhileRunning);
        assert_eq!(tracker.phase(TrafficType::TcpServer), SessionPhase::Running);
        assert_eq!(tracker.counts(TrafficType::TcpServer).started, 2);
    }

    #[test]
    fn unknown_codes_do_not_move_state() {
        let mut tracker = SessionTracker::new();
        let note = tracker.observe(SessionEvent::started(TrafficType::Other(11)));
        assert_eq!(note, LifecycleNote::Ignored);
        assert!(!tracker.any_running());

        tracker.observe(SessionEvent::started(TrafficType::UdpClient));
        let note = tracker.observe(SessionEvent::new(TrafficType::UdpClient, SessionStatus::Other(3)));
        assert_eq!(note, LifecycleNote::Ignored);
        assert_eq!(tracker.phase(TrafficType::UdpClient), SessionPhase::Running);
    }

    #[test]
    fn delivered_events_reach_hook_in_report_order() {
        let mut tracker = SessionTracker::new();
        let hook = RecordingHook::default();
        let reported = [
            SessionEvent::started(TrafficType::UdpServer),
            SessionEvent::stopped(TrafficType::UdpServer),
            SessionEvent::started(TrafficType::TcpClient),
        ];

        let notes: Vec<LifecycleNote> = reported
            .iter()
            .map(|event| {
                let delivery = deliver_session_event(&mut tracker, Some(&hook), *event);
                assert!(delivery.hooked);
                delivery.note
            })
            .collect();

        assert_eq!(
            notes,
            vec![LifecycleNote::Began, LifecycleNote::Ended, LifecycleNote::Began]
        );
        assert_eq!(*hook.seen.lock().unwrap(), reported.to_vec());
        assert_eq!(tracker.phase(TrafficType::TcpClient), SessionPhase::Running);
    }

    #[test]
    fn anomalous_boundary_is_still_delivered() {
        let mut tracker = SessionTracker::new();
        let hook = RecordingHook::default();
        let stray = SessionEvent::stopped(TrafficType::TcpServer);

        let delivery = deliver_session_event(&mut tracker, Some(&hook), stray);

        assert_eq!(delivery.note, LifecycleNote::StopWithoutStart);
        assert!(delivery.hooked);
        assert_eq!(*hook.seen.lock().unwrap(), vec![stray]);
    }

    #[test]
    fn missing_hook_still_tracks_lifecycle() {
        let mut tracker = SessionTracker::new();
        let delivery =
            deliver_session_event(&mut tracker, None, SessionEvent::started(TrafficType::UdpClient));

        assert_eq!(
            delivery,
            Delivery {
                note: LifecycleNote::Began,
                hooked: false
            }
        );
        assert_eq!(tracker.phase(TrafficType::UdpClient), SessionPhase::Running);
    }
}
