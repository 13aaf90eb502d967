//! Globe controller: owns the map handle, the frame loop, the interaction flags
//! and every pending phase for one mounted globe.
//!
//! The host forwards map events and animation frames with its own timestamps and
//! arms a single timer for [`GlobeController::next_deadline`], calling
//! [`GlobeController::advance_to`] when it fires. Nothing here reads a clock.

use std::sync::Arc;

use formats::{FeatureCollection, Normalize, Region};
use foundation::geo::LngLat;
use foundation::time::Millis;
use layers::{
    CENTROID_SOURCE_ID, POLYGON_SOURCE_ID, RenderSet, centroid_circle_layer, polygon_fill_layer,
};
use runtime::frame::{FrameHandle, FrameScheduler};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::camera::{CameraEase, Easing, MoveOrigin};
use crate::choreography::{Phase, PhaseQueue};
use crate::config::GlobeConfig;
use crate::interaction::{GlobeMode, InteractionEvent, InteractionState};
use crate::map::MapHandle;
use crate::spin::SpinLoop;

type RegionCallback = Box<dyn FnMut(&Region)>;

pub struct GlobeController<M: MapHandle, F: FrameScheduler> {
    map: Option<M>,
    frames: F,
    config: GlobeConfig,
    render: RenderSet,
    state: InteractionState,
    phases: PhaseQueue,
    spin: SpinLoop,
    frame_request: Option<FrameHandle>,
    style_loaded: bool,
    attached: bool,
    selected: Option<Region>,
    on_region: Option<RegionCallback>,
}

impl<M: MapHandle, F: FrameScheduler> GlobeController<M, F> {
    /// Takes ownership of a freshly constructed map and schedules the spin loop.
    ///
    /// An invalid `config` is replaced by the defaults.
    pub fn mount(
        map: M,
        frames: F,
        dataset: Arc<FeatureCollection>,
        config: GlobeConfig,
        now: Millis,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(error = %err, "invalid globe config, using defaults");
                GlobeConfig::default()
            }
        };
        let render = RenderSet::prepare(dataset, config.render.feature_cap);
        let mut phases = PhaseQueue::new();
        phases.schedule(now, config.timing.loop_start_delay_ms, Phase::StartSpinLoop);
        info!(
            features = render.len(),
            centroids = render.centroids().len(),
            "globe mounted"
        );

        Self {
            map: Some(map),
            frames,
            spin: SpinLoop::new(&config.spin),
            config,
            render,
            state: InteractionState::base(),
            phases,
            frame_request: None,
            style_loaded: false,
            attached: true,
            selected: None,
            on_region: None,
        }
    }

    /// Registers the host callback invoked with each clicked region.
    pub fn on_region_selected(&mut self, callback: impl FnMut(&Region) + 'static) {
        self.on_region = Some(Box::new(callback));
    }

    /// Adds both sources and layers, then frames the data. Later style loads are ignored.
    pub fn on_style_load(&mut self) {
        if !self.attached || self.style_loaded {
            return;
        }
        let Some(map) = self.map.as_mut() else {
            return;
        };

        map.add_source(POLYGON_SOURCE_ID, &self.render.polygons_geojson());
        map.add_source(CENTROID_SOURCE_ID, &self.render.centroids_geojson());
        map.add_layer(&polygon_fill_layer());
        map.add_layer(&centroid_circle_layer());

        if self.config.render.fit_to_data
            && let Some(bounds) = self.render.bounds()
        {
            map.fit_bounds(&bounds, self.config.render.fit_padding_px);
        }
        self.style_loaded = true;
    }

    /// Replaces the rendered collection.
    pub fn set_dataset(&mut self, dataset: Arc<FeatureCollection>) {
        self.render = RenderSet::prepare(dataset, self.config.render.feature_cap);
        if !self.attached || !self.style_loaded {
            return;
        }
        if let Some(map) = self.map.as_mut() {
            map.set_source_data(POLYGON_SOURCE_ID, &self.render.polygons_geojson());
            map.set_source_data(CENTROID_SOURCE_ID, &self.render.centroids_geojson());
        }
    }

    pub fn on_pointer_down(&mut self, now: Millis) {
        self.begin_interaction(InteractionEvent::PointerDown, now);
    }

    pub fn on_drag_start(&mut self, now: Millis) {
        self.begin_interaction(InteractionEvent::DragStart, now);
    }

    pub fn on_pointer_up(&mut self, now: Millis) {
        if self.attached {
            self.apply(InteractionEvent::PointerUp, now);
        }
    }

    pub fn on_touch_end(&mut self, now: Millis) {
        if self.attached {
            self.apply(InteractionEvent::TouchEnd, now);
        }
    }

    /// A camera movement ended. Spin steps end constantly and are not interactions.
    pub fn on_move_end(&mut self, now: Millis, origin: MoveOrigin) {
        if !self.attached || origin == MoveOrigin::Spin {
            return;
        }
        self.apply(InteractionEvent::MoveEnd { at: now }, now);
    }

    /// Marker click: freeze, then fly to `position` and settle.
    ///
    /// Returns the normalized region with the clicked coordinates attached.
    pub fn on_feature_click(
        &mut self,
        properties: &Map<String, Value>,
        position: LngLat,
        now: Millis,
    ) -> Option<Region> {
        if !self.attached {
            return None;
        }
        let map = self.map.as_mut()?;

        self.phases.cancel_resumes();
        let superseded = self.phases.cancel_focus();
        if superseded > 0 {
            debug!(superseded, "previous focus sequence cancelled");
        }

        let step = self.state.step(InteractionEvent::FeatureClicked, &self.config.timing);
        self.state = step.state;
        if let Some(handle) = self.frame_request.take() {
            self.frames.cancel_frame(handle);
        }

        let pose = map.camera();
        map.jump_to(&pose);
        self.phases
            .schedule_focus(now, position, pose.zoom, &self.config.timing);

        let region = properties.normalize().with_position(position.lng, position.lat);
        info!(name = %region.name, lng = position.lng, lat = position.lat, "region selected");
        self.selected = Some(region.clone());
        if let Some(callback) = self.on_region.as_mut() {
            callback(&region);
        }
        Some(region)
    }

    pub fn on_marker_enter(&mut self) {
        self.set_cursor("pointer");
    }

    pub fn on_marker_leave(&mut self) {
        self.set_cursor("");
    }

    /// Animation-frame callback. Ignored unless a frame was requested.
    pub fn on_frame(&mut self, now: Millis) {
        if !self.attached || self.frame_request.take().is_none() {
            return;
        }
        self.advance_to(now);
        if self.state.feature_clicked {
            return;
        }
        if let Some(map) = self.map.as_mut() {
            self.spin.tick(now, &self.state, map, &self.config.spin);
        }
        self.request_frame();
    }

    /// Fires every phase due at or before `now`, in order.
    pub fn advance_to(&mut self, now: Millis) {
        while self.attached
            && let Some(phase) = self.phases.pop_due(now)
        {
            debug!(phase = phase.name(), at = now.0, "phase fired");
            self.fire(phase, now);
        }
    }

    /// When the host should next call [`GlobeController::advance_to`].
    pub fn next_deadline(&self) -> Option<Millis> {
        self.phases.next_due()
    }

    /// Stops the loop, drops every pending phase and removes the map.
    ///
    /// Returns the removed map so the host can drop it; later events are no-ops.
    pub fn unmount(&mut self) -> Option<M> {
        self.attached = false;
        if let Some(handle) = self.frame_request.take() {
            self.frames.cancel_frame(handle);
        }
        let dropped = self.phases.clear();
        let mut map = self.map.take()?;
        map.remove();
        info!(dropped_phases = dropped, "globe unmounted");
        Some(map)
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self, now: Millis) -> GlobeMode {
        self.state.mode(now)
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selected.as_ref()
    }

    pub fn render_set(&self) -> &RenderSet {
        &self.render
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn phases(&self) -> &PhaseQueue {
        &self.phases
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_request.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.attached
    }

    fn begin_interaction(&mut self, event: InteractionEvent, now: Millis) {
        if !self.attached {
            return;
        }
        self.phases.cancel_resumes();
        self.apply(event, now);
    }

    fn apply(&mut self, event: InteractionEvent, now: Millis) {
        let step = self.state.step(event, &self.config.timing);
        if step.state != self.state {
            debug!(?event, mode = ?step.state.mode(now), "interaction state changed");
        }
        self.state = step.state;
        if let Some(deferred) = step.defer {
            self.phases.cancel_interaction(deferred.event);
            self.phases
                .schedule(now, deferred.delay_ms, Phase::Interaction(deferred.event));
        }
    }

    fn fire(&mut self, phase: Phase, now: Millis) {
        match phase {
            Phase::StartSpinLoop => {
                if !self.state.feature_clicked {
                    self.request_frame();
                }
            }
            Phase::Interaction(event) => self.apply(event, now),
            Phase::FlyToFeature { center, zoom } => {
                if let Some(map) = self.map.as_mut() {
                    let ease = CameraEase {
                        center,
                        zoom: Some(zoom),
                        duration_ms: self.config.timing.focus_duration_ms,
                        easing: Easing::EaseInOutQuad,
                        essential: true,
                    };
                    map.fly_to(&ease, MoveOrigin::Focus);
                }
            }
            Phase::SettleTransition => {
                self.apply(InteractionEvent::TransitionSettled, now);
                self.spin.reset();
                self.request_frame();
            }
        }
    }

    fn request_frame(&mut self) {
        if self.frame_request.is_none() {
            self.frame_request = Some(self.frames.request_frame());
        }
    }

    fn set_cursor(&mut self, cursor: &str) {
        if !self.attached {
            return;
        }
        if let Some(map) = self.map.as_mut() {
            map.set_cursor(cursor);
        }
    }
}
