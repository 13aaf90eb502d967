use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use dataset::{Availability, DataLoader, LoadOrigin, SourceError};
use formats::Region;
use foundation::geo::LngLat;
use foundation::time::Millis;
use globe::{GlobeConfig, GlobeController, MoveOrigin};
use layers::CENTROID_LAYER_ID;
use serde::Serialize;
use serde_json::{Map, Value, json};

mod frames;
mod mapbox;
use frames::RafFrames;
use mapbox::{
    MapboxHandle, MapboxMap, add_default_controls, clicked_feature, move_origin, set_access_token,
    to_js,
};

/// Map and browser events, queued so that events the map fires synchronously
/// from inside a controller call are handled after that call returns.
enum HostEvent {
    StyleLoad,
    PointerDown,
    DragStart,
    PointerUp,
    TouchEnd,
    MoveEnd(MoveOrigin),
    Click(Map<String, Value>, LngLat),
    MarkerEnter,
    MarkerLeave,
    Frame(f64),
    Timer,
}

struct Host {
    controller: GlobeController<MapboxHandle, RafFrames>,
    window: web_sys::Window,
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
    timer_callback: Closure<dyn FnMut()>,
    timer: Option<i32>,
    on_region: Option<js_sys::Function>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataStatus {
    #[serde(flatten)]
    availability: Availability,
    label: &'static str,
    used_fallback: bool,
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
    static QUEUE: RefCell<VecDeque<HostEvent>> = const { RefCell::new(VecDeque::new()) };
    static LOADER: RefCell<DataLoader> = RefCell::new(DataLoader::new());
    /// Bumped by every `mount` and `unmount`; a pending mount only completes if it
    /// still holds the latest value.
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn bump_generation() -> u64 {
    GENERATION.with(|g| {
        let next = g.get().wrapping_add(1);
        g.set(next);
        next
    })
}

fn is_current(generation: u64) -> bool {
    GENERATION.with(|g| g.get() == generation)
}

pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn now_ms(window: &web_sys::Window) -> Millis {
    Millis(window.performance().map(|p| p.now()).unwrap_or_default())
}

impl Host {
    fn handle(&mut self, event: HostEvent) -> Option<Region> {
        let now = now_ms(&self.window);
        let c = &mut self.controller;
        match event {
            HostEvent::StyleLoad => c.on_style_load(),
            HostEvent::PointerDown => c.on_pointer_down(now),
            HostEvent::DragStart => c.on_drag_start(now),
            HostEvent::PointerUp => c.on_pointer_up(now),
            HostEvent::TouchEnd => c.on_touch_end(now),
            HostEvent::MoveEnd(origin) => c.on_move_end(now, origin),
            HostEvent::Click(properties, position) => {
                return c.on_feature_click(&properties, position, now);
            }
            HostEvent::MarkerEnter => c.on_marker_enter(),
            HostEvent::MarkerLeave => c.on_marker_leave(),
            HostEvent::Frame(t) => c.on_frame(Millis(t)),
            HostEvent::Timer => {
                self.timer = None;
                c.advance_to(now);
            }
        }
        None
    }

    /// Keeps exactly one browser timeout armed for the controller's next phase.
    fn rearm_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
        let Some(deadline) = self.controller.next_deadline() else {
            return;
        };
        let delay = deadline.since(now_ms(&self.window)).max(0.0).ceil() as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.timer_callback.as_ref().unchecked_ref(),
                delay,
            ) {
            Ok(id) => self.timer = Some(id),
            Err(err) => log(&format!("setTimeout failed: {:?}", err)),
        }
    }
}

fn dispatch(event: HostEvent) {
    QUEUE.with(|q| q.borrow_mut().push_back(event));

    let mut selected = Vec::new();
    HOST.with(|cell| {
        // Re-entrant call: the handler further up the stack drains the queue.
        let Ok(mut guard) = cell.try_borrow_mut() else {
            return;
        };
        let Some(host) = guard.as_mut() else {
            QUEUE.with(|q| q.borrow_mut().clear());
            return;
        };
        while let Some(event) = QUEUE.with(|q| q.borrow_mut().pop_front()) {
            if let Some(region) = host.handle(event) {
                selected.push((host.on_region.clone(), region));
            }
        }
        host.rearm_timer();
    });

    // Host callbacks run outside the borrow so they may call back in.
    for (callback, region) in selected {
        let Some(callback) = callback else { continue };
        let payload = serde_json::to_string(&region).unwrap_or_default();
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
            log(&format!("region callback failed: {:?}", err));
        }
    }
}

fn listener(make: impl Fn(JsValue) -> Option<HostEvent> + 'static) -> Closure<dyn FnMut(JsValue)> {
    Closure::<dyn FnMut(JsValue)>::new(move |e: JsValue| {
        if let Some(event) = make(e) {
            dispatch(event);
        }
    })
}

fn attach_listeners(map: &MapboxMap) -> Vec<Closure<dyn FnMut(JsValue)>> {
    let global = [
        ("style.load", listener(|_| Some(HostEvent::StyleLoad))),
        ("mousedown", listener(|_| Some(HostEvent::PointerDown))),
        ("dragstart", listener(|_| Some(HostEvent::DragStart))),
        ("mouseup", listener(|_| Some(HostEvent::PointerUp))),
        ("touchend", listener(|_| Some(HostEvent::TouchEnd))),
        ("moveend", listener(|e| Some(HostEvent::MoveEnd(move_origin(&e))))),
    ];
    let on_centroids = [
        (
            "click",
            listener(|e| clicked_feature(&e).map(|(props, at)| HostEvent::Click(props, at))),
        ),
        ("mouseenter", listener(|_| Some(HostEvent::MarkerEnter))),
        ("mouseleave", listener(|_| Some(HostEvent::MarkerLeave))),
    ];

    let mut kept = Vec::new();
    for (event, handler) in global {
        map.on(event, &handler);
        kept.push(handler);
    }
    for (event, handler) in on_centroids {
        map.on_layer(event, CENTROID_LAYER_ID, &handler);
        kept.push(handler);
    }
    kept
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Loads the dataset (once per session) and mounts the globe into `container`.
///
/// `on_region` receives each clicked region as a JSON string.
#[wasm_bindgen]
pub fn mount(
    container: String,
    access_token: String,
    data_url: String,
    config_json: Option<String>,
    on_region: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    let config = match config_json {
        Some(text) => {
            GlobeConfig::from_json_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => GlobeConfig::default(),
    };

    let generation = bump_generation();
    spawn_local(async move {
        let cached = LOADER.with(|l| l.borrow().cached());
        let dataset = match cached {
            Some(dataset) => dataset,
            None => {
                let payload = fetch_text(&data_url).await;
                LOADER.with(|l| l.borrow_mut().load_payload(payload))
            }
        };
        if !is_current(generation) {
            log("globe mount superseded before the dataset arrived");
            return;
        }
        if let Err(err) = mount_inner(&container, &access_token, dataset, config, on_region) {
            log(&format!("globe mount failed: {:?}", err));
        }
    });
    Ok(())
}

fn mount_inner(
    container: &str,
    access_token: &str,
    dataset: std::sync::Arc<formats::FeatureCollection>,
    config: GlobeConfig,
    on_region: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    teardown();
    set_access_token(access_token);

    let m = &config.map;
    let options = json!({
        "container": container,
        "style": m.style,
        "projection": m.projection,
        "zoom": m.zoom,
        "center": m.center,
        "pitch": m.pitch,
        "bearing": m.bearing,
        "antialias": m.antialias,
    });
    let map = MapboxMap::new(&to_js(&options));
    add_default_controls(&map);
    let listeners = attach_listeners(&map);

    let frames = RafFrames::new(
        window.clone(),
        Closure::<dyn FnMut(f64)>::new(|t: f64| dispatch(HostEvent::Frame(t))),
    );
    let now = now_ms(&window);
    let controller =
        GlobeController::mount(MapboxHandle::new(map), frames, dataset, config, now);

    let mut host = Host {
        controller,
        window,
        listeners,
        timer_callback: Closure::<dyn FnMut()>::new(|| dispatch(HostEvent::Timer)),
        timer: None,
        on_region,
    };
    host.rearm_timer();
    HOST.with(|cell| *cell.borrow_mut() = Some(host));
    Ok(())
}

/// Stops the globe and removes the map. Safe to call when nothing is mounted, and
/// cancels a mount still waiting for its dataset.
#[wasm_bindgen]
pub fn unmount() {
    bump_generation();
    teardown();
}

fn teardown() {
    let host = HOST.with(|cell| cell.try_borrow_mut().ok().and_then(|mut h| h.take()));
    QUEUE.with(|q| q.borrow_mut().clear());
    let Some(mut host) = host else {
        return;
    };
    if let Some(id) = host.timer.take() {
        host.window.clear_timeout_with_handle(id);
    }
    drop(host.controller.unmount());
    host.listeners.clear();
}

/// Availability of the loaded dataset as JSON, for the data status indicator.
#[wasm_bindgen]
pub fn data_status() -> String {
    LOADER.with(|l| {
        let loader = l.borrow();
        let status = DataStatus {
            availability: loader.check_availability(),
            label: loader.tier().status_label(),
            used_fallback: loader.origin() == Some(LoadOrigin::Fallback),
        };
        serde_json::to_string(&status).unwrap_or_default()
    })
}

/// The most recently clicked region as JSON, or `null`.
#[wasm_bindgen]
pub fn selected_region() -> String {
    let region = HOST.with(|cell| {
        let guard = cell.try_borrow().ok()?;
        guard.as_ref()?.controller.selected_region().cloned()
    });
    serde_json::to_string(&region).unwrap_or_else(|_| "null".to_string())
}

async fn fetch_text(url: &str) -> Result<String, SourceError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;
    if !resp.ok() {
        return Err(SourceError::Unavailable(format!(
            "{} returned HTTP {}",
            url,
            resp.status()
        )));
    }
    resp.text()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))
}
