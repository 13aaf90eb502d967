use foundation::geo::LngLat;
use foundation::time::Millis;
use runtime::timers::{TimerId, TimerQueue};

use crate::config::TimingConfig;
use crate::interaction::InteractionEvent;

/// A named step of the controller's timed sequences.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Phase {
    /// First animation-frame request after mount.
    StartSpinLoop,
    /// Deferred interaction event, such as a resume after release.
    Interaction(InteractionEvent),
    /// Ease to the clicked marker, keeping the pre-click zoom.
    FlyToFeature { center: LngLat, zoom: f64 },
    /// End of the click sequence: transition flag cleared and frames requested again.
    SettleTransition,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::StartSpinLoop => "start_spin_loop",
            Phase::Interaction(_) => "interaction",
            Phase::FlyToFeature { .. } => "fly_to_feature",
            Phase::SettleTransition => "settle_transition",
        }
    }

    fn is_focus(&self) -> bool {
        matches!(self, Phase::FlyToFeature { .. } | Phase::SettleTransition)
    }

    fn is_resume(&self) -> bool {
        matches!(self, Phase::Interaction(event) if event.is_resume())
    }
}

/// All pending phases of one controller, on one virtual clock.
#[derive(Debug, Clone, Default)]
pub struct PhaseQueue {
    timers: TimerQueue<Phase>,
}

impl PhaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Millis, delay_ms: f64, phase: Phase) -> TimerId {
        tracing::trace!(phase = phase.name(), delay_ms, "phase scheduled");
        self.timers.schedule(now, delay_ms, phase)
    }

    /// Queues the click sequence: fly-to after the focus delay, then settle once the
    /// resume delay has passed.
    pub fn schedule_focus(&mut self, now: Millis, center: LngLat, zoom: f64, timing: &TimingConfig) {
        self.schedule(
            now,
            timing.focus_delay_ms,
            Phase::FlyToFeature { center, zoom },
        );
        self.schedule(
            now,
            timing.focus_delay_ms + timing.transition_resume_ms,
            Phase::SettleTransition,
        );
    }

    /// Drops a click sequence that has not finished yet.
    pub fn cancel_focus(&mut self) -> usize {
        self.timers.cancel_where(Phase::is_focus)
    }

    /// Drops pending deliveries of `event`.
    pub fn cancel_interaction(&mut self, event: InteractionEvent) -> usize {
        self.timers
            .cancel_where(|phase| *phase == Phase::Interaction(event))
    }

    /// Drops pending resume follow-ups.
    pub fn cancel_resumes(&mut self) -> usize {
        self.timers.cancel_where(Phase::is_resume)
    }

    pub fn pop_due(&mut self, now: Millis) -> Option<Phase> {
        self.timers.pop_due(now).map(|(_, phase)| phase)
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    pub fn contains(&self, pred: impl FnMut(&Phase) -> bool) -> bool {
        self.timers.contains(pred)
    }

    pub fn clear(&mut self) -> usize {
        self.timers.clear()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Phase, PhaseQueue};
    use crate::config::TimingConfig;
    use crate::interaction::InteractionEvent;
    use foundation::geo::LngLat;
    use foundation::time::Millis;

    #[test]
    fn focus_sequence_fires_in_order() {
        let mut q = PhaseQueue::new();
        let center = LngLat::new(103.8, 1.3);
        q.schedule_focus(Millis(1_000.0), center, 2.0, &TimingConfig::default());

        assert_eq!(q.pop_due(Millis(1_099.0)), None);
        assert_eq!(
            q.pop_due(Millis(1_100.0)),
            Some(Phase::FlyToFeature { center, zoom: 2.0 })
        );
        assert_eq!(q.next_due(), Some(Millis(3_100.0)));
        assert_eq!(q.pop_due(Millis(3_100.0)), Some(Phase::SettleTransition));
        assert!(q.is_empty());
    }

    #[test]
    fn cancellation_is_selective() {
        let mut q = PhaseQueue::new();
        q.schedule(Millis(0.0), 1_000.0, Phase::StartSpinLoop);
        q.schedule(
            Millis(0.0),
            1_000.0,
            Phase::Interaction(InteractionEvent::ResumeAfterRelease),
        );
        q.schedule_focus(Millis(0.0), LngLat::new(0.0, 0.0), 2.0, &TimingConfig::default());

        assert_eq!(q.cancel_resumes(), 1);
        assert_eq!(q.cancel_focus(), 2);
        assert_eq!(q.len(), 1);
        assert!(q.contains(|p| *p == Phase::StartSpinLoop));
        assert_eq!(q.clear(), 1);
    }
}
