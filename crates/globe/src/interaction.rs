//! Interaction flags and their transitions.
//!
//! [`InteractionState::step`] is pure: it returns the next state plus, at most, one
//! follow-up event the caller should deliver after a delay. Timers, the map and the
//! frame loop live in the controller.

use foundation::time::Millis;

use crate::config::{SpinConfig, TimingConfig};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InteractionEvent {
    PointerDown,
    DragStart,
    PointerUp,
    TouchEnd,
    ResumeAfterRelease,
    /// A camera movement not started by the spin loop has finished.
    MoveEnd { at: Millis },
    ResumeAfterMove,
    FeatureClicked,
    TransitionSettled,
}

impl InteractionEvent {
    /// Follow-ups scheduled by earlier events to re-enable spin.
    pub fn is_resume(&self) -> bool {
        matches!(
            self,
            InteractionEvent::ResumeAfterRelease | InteractionEvent::ResumeAfterMove
        )
    }
}

/// An event to deliver `delay_ms` after the step that produced it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Deferred {
    pub delay_ms: f64,
    pub event: InteractionEvent,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Step {
    pub state: InteractionState,
    pub defer: Option<Deferred>,
}

/// Derived view of the flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlobeMode {
    IdleSpinning,
    UserInteracting,
    FeatureTransition,
    Paused,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InteractionState {
    pub user_interacting: bool,
    pub spin_enabled: bool,
    pub feature_clicked: bool,
    pub animating: bool,
    pub pause_until: Millis,
    /// A pointer is down on the map, whether or not a transition swallowed its release.
    pub pointer_held: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::base()
    }
}

impl InteractionState {
    /// State on mount.
    pub fn base() -> Self {
        Self {
            user_interacting: false,
            spin_enabled: true,
            feature_clicked: false,
            animating: false,
            pause_until: Millis::ZERO,
            pointer_held: false,
        }
    }

    pub fn step(&self, event: InteractionEvent, timing: &TimingConfig) -> Step {
        let mut next = *self;
        let mut defer = None;

        match event {
            InteractionEvent::PointerDown => {
                next.user_interacting = true;
                next.spin_enabled = false;
                next.pointer_held = true;
            }
            InteractionEvent::DragStart => {
                next.user_interacting = true;
                next.spin_enabled = false;
                next.animating = true;
                next.pointer_held = true;
            }
            InteractionEvent::PointerUp | InteractionEvent::TouchEnd => {
                next.pointer_held = false;
                if self.user_interacting && !self.feature_clicked {
                    next.user_interacting = false;
                    defer = Some(Deferred {
                        delay_ms: timing.release_resume_ms,
                        event: InteractionEvent::ResumeAfterRelease,
                    });
                }
            }
            InteractionEvent::ResumeAfterRelease => {
                next.animating = false;
                if !self.feature_clicked && !self.user_interacting {
                    next.spin_enabled = true;
                }
            }
            InteractionEvent::MoveEnd { at } => {
                next.animating = false;
                if !self.feature_clicked && !self.user_interacting {
                    next.pause_until = at.after(timing.move_pause_ms);
                    defer = Some(Deferred {
                        delay_ms: timing.move_pause_ms,
                        event: InteractionEvent::ResumeAfterMove,
                    });
                }
            }
            InteractionEvent::ResumeAfterMove => {
                if !self.feature_clicked && !self.user_interacting {
                    next.spin_enabled = true;
                }
            }
            InteractionEvent::FeatureClicked => {
                next.spin_enabled = false;
                next.feature_clicked = true;
            }
            InteractionEvent::TransitionSettled => {
                next.feature_clicked = false;
                if self.pointer_held {
                    // Still dragging: the release path resumes spin later.
                    next.spin_enabled = false;
                } else {
                    next.user_interacting = false;
                    next.animating = false;
                    next.spin_enabled = true;
                }
            }
        }

        Step { state: next, defer }
    }

    pub fn mode(&self, now: Millis) -> GlobeMode {
        if self.feature_clicked {
            GlobeMode::FeatureTransition
        } else if self.user_interacting {
            GlobeMode::UserInteracting
        } else if self.spin_enabled && !self.animating && now >= self.pause_until {
            GlobeMode::IdleSpinning
        } else {
            GlobeMode::Paused
        }
    }

    /// Whether a spin step may be issued at `now` with the camera at `zoom`.
    pub fn can_rotate(&self, now: Millis, zoom: f64, spin: &SpinConfig) -> bool {
        self.mode(now) == GlobeMode::IdleSpinning && zoom < spin.max_spin_zoom
    }
}
