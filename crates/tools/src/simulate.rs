//! Offline runs of the globe controller on a virtual clock.

use std::str::FromStr;
use std::sync::Arc;

use formats::FeatureCollection;
use foundation::geo::LngLat;
use foundation::time::Millis;
use globe::{
    CameraPose, GlobeConfig, GlobeController, GlobeMode, MapCommand, MapHandle, MoveOrigin,
    RecordingMap,
};
use runtime::frame::ManualFrames;
use serde::Serialize;
use serde_json::Map;

/// Something a user does during the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Marker click at a position.
    Click(LngLat),
    /// Press, drag for `duration_ms`, release.
    Drag { duration_ms: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction {
    pub at_ms: f64,
    pub action: Action,
}

impl FromStr for ScheduledAction {
    type Err = String;

    /// `T:click:LNG,LAT` or `T:drag:DURATION`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(at), Some(kind), Some(arg)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected T:click:LNG,LAT or T:drag:MS, got {s:?}"));
        };
        let at_ms: f64 = at.parse().map_err(|_| format!("bad time {at:?}"))?;
        let action = match kind {
            "click" => {
                let (lng, lat) = arg
                    .split_once(',')
                    .ok_or_else(|| format!("bad position {arg:?}"))?;
                let lng = lng.trim().parse().map_err(|_| format!("bad lng {lng:?}"))?;
                let lat = lat.trim().parse().map_err(|_| format!("bad lat {lat:?}"))?;
                Action::Click(LngLat::new(lng, lat))
            }
            "drag" => Action::Drag {
                duration_ms: arg.parse().map_err(|_| format!("bad duration {arg:?}"))?,
            },
            other => return Err(format!("unknown action {other:?}")),
        };
        Ok(Self { at_ms, action })
    }
}

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub duration_ms: f64,
    /// Display refresh interval; 60 Hz by default.
    pub frame_interval_ms: f64,
    pub actions: Vec<ScheduledAction>,
}

impl Default for SimulationPlan {
    fn default() -> Self {
        Self {
            duration_ms: 10_000.0,
            frame_interval_ms: 1000.0 / 60.0,
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeChange {
    pub at_ms: f64,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    pub at_ms: f64,
    pub center: LngLat,
    pub zoom: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub spin_steps: usize,
    pub freezes: usize,
    pub flights: Vec<FlightRecord>,
    pub modes: Vec<ModeChange>,
    pub selected: Vec<String>,
    pub final_camera: CameraPose,
}

enum Input {
    Click(LngLat),
    Press,
    Release,
}

/// Runs the controller from mount to `plan.duration_ms`, delivering frames at the
/// display rate and user input at the planned times.
pub fn run(dataset: Arc<FeatureCollection>, config: GlobeConfig, plan: &SimulationPlan) -> SimulationReport {
    let camera = CameraPose {
        center: config.map.center,
        zoom: config.map.zoom,
        bearing: config.map.bearing,
        pitch: config.map.pitch,
    };
    let mut ctrl = GlobeController::mount(
        RecordingMap::new(camera),
        ManualFrames::new(),
        dataset,
        config,
        Millis::ZERO,
    );
    ctrl.on_style_load();

    let mut inputs: Vec<(f64, Input)> = Vec::new();
    for scheduled in &plan.actions {
        match scheduled.action {
            Action::Click(at) => inputs.push((scheduled.at_ms, Input::Click(at))),
            Action::Drag { duration_ms } => {
                inputs.push((scheduled.at_ms, Input::Press));
                inputs.push((scheduled.at_ms + duration_ms, Input::Release));
            }
        }
    }
    inputs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut inputs = inputs.into_iter().peekable();

    let mut report = SimulationReport {
        spin_steps: 0,
        freezes: 0,
        flights: Vec::new(),
        modes: Vec::new(),
        selected: Vec::new(),
        final_camera: camera,
    };
    let mut seen_commands = 0;
    let mut last_mode: Option<GlobeMode> = None;
    let step = plan.frame_interval_ms.max(1.0);

    let mut t = 0.0;
    while t <= plan.duration_ms {
        let now = Millis(t);
        while let Some((_, input)) = inputs.next_if(|(at, _)| *at <= t) {
            match input {
                Input::Click(position) => {
                    if let Some(region) = ctrl.on_feature_click(&Map::new(), position, now) {
                        report.selected.push(region.name);
                    }
                }
                Input::Press => {
                    ctrl.on_pointer_down(now);
                    ctrl.on_drag_start(now);
                }
                Input::Release => {
                    ctrl.on_pointer_up(now);
                    ctrl.on_move_end(now, MoveOrigin::User);
                }
            }
        }
        ctrl.advance_to(now);
        ctrl.on_frame(now);

        if let Some(map) = ctrl.map() {
            for command in &map.commands()[seen_commands..] {
                match command {
                    MapCommand::EaseTo {
                        origin: MoveOrigin::Spin,
                        ..
                    } => report.spin_steps += 1,
                    MapCommand::JumpTo(_) => report.freezes += 1,
                    MapCommand::FlyTo { ease, .. } => report.flights.push(FlightRecord {
                        at_ms: t,
                        center: ease.center,
                        zoom: ease.zoom,
                    }),
                    _ => {}
                }
            }
            seen_commands = map.commands().len();
        }

        let mode = ctrl.mode(now);
        if last_mode != Some(mode) {
            report.modes.push(ModeChange {
                at_ms: t,
                mode: format!("{mode:?}"),
            });
            last_mode = Some(mode);
        }
        t += step;
    }

    if let Some(map) = ctrl.map() {
        report.final_camera = map.camera();
    }
    ctrl.unmount();
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Action, ScheduledAction, SimulationPlan, run};
    use dataset::fallback_collection;
    use foundation::geo::LngLat;
    use globe::GlobeConfig;

    fn plan(actions: &[&str]) -> SimulationPlan {
        SimulationPlan {
            duration_ms: 5_000.0,
            frame_interval_ms: 10.0,
            actions: actions.iter().map(|a| a.parse().expect("action")).collect(),
        }
    }

    #[test]
    fn parses_actions() {
        assert_eq!(
            "1500:click:103.8,1.3".parse::<ScheduledAction>(),
            Ok(ScheduledAction {
                at_ms: 1500.0,
                action: Action::Click(LngLat::new(103.8, 1.3)),
            })
        );
        assert_eq!(
            "200:drag:800".parse::<ScheduledAction>().map(|a| a.action),
            Ok(Action::Drag { duration_ms: 800.0 })
        );
        assert!("200:wave:1".parse::<ScheduledAction>().is_err());
        assert!("200".parse::<ScheduledAction>().is_err());
    }

    #[test]
    fn idle_run_only_spins() {
        let report = run(
            Arc::new(fallback_collection()),
            GlobeConfig::default(),
            &plan(&[]),
        );
        assert!(report.spin_steps > 0);
        assert!(report.flights.is_empty());
        assert!(report.final_camera.center.lng < 30.0);
        assert_eq!(report.modes.len(), 1);
    }

    #[test]
    fn click_produces_one_flight_after_the_focus_delay() {
        let report = run(
            Arc::new(fallback_collection()),
            GlobeConfig::default(),
            &plan(&["1500:click:103.8,1.3"]),
        );
        assert_eq!(report.freezes, 1);
        assert_eq!(report.flights.len(), 1);
        assert_eq!(report.flights[0].at_ms, 1600.0);
        assert_eq!(report.flights[0].center, LngLat::new(103.8, 1.3));
        assert_eq!(report.selected, vec!["Unnamed Region".to_string()]);
        let modes: Vec<&str> = report.modes.iter().map(|m| m.mode.as_str()).collect();
        assert_eq!(modes, vec!["IdleSpinning", "FeatureTransition", "IdleSpinning"]);
        assert_eq!(report.modes[2].at_ms, 3600.0);
    }
}
