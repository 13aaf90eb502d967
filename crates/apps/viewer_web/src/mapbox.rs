use foundation::bounds::LngLatBounds;
use foundation::geo::LngLat;
use globe::{CameraEase, CameraPose, Easing, MapHandle, MoveOrigin};
use js_sys::{Array, JSON, Object, Reflect};
use layers::LayerSpec;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    pub type MapboxMap;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "Map")]
    pub fn new(options: &JsValue) -> MapboxMap;

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &MapboxMap) -> JsValue;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &MapboxMap) -> f64;

    #[wasm_bindgen(method, js_name = getBearing)]
    fn get_bearing(this: &MapboxMap) -> f64;

    #[wasm_bindgen(method, js_name = getPitch)]
    fn get_pitch(this: &MapboxMap) -> f64;

    #[wasm_bindgen(method, js_name = jumpTo)]
    fn jump_to(this: &MapboxMap, options: &JsValue);

    #[wasm_bindgen(method, js_name = easeTo)]
    fn ease_to(this: &MapboxMap, options: &JsValue, event_data: &JsValue);

    #[wasm_bindgen(method, js_name = flyTo)]
    fn fly_to(this: &MapboxMap, options: &JsValue, event_data: &JsValue);

    #[wasm_bindgen(method, js_name = addSource)]
    fn add_source(this: &MapboxMap, id: &str, source: &JsValue);

    #[wasm_bindgen(method, js_name = getSource)]
    fn get_source(this: &MapboxMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &MapboxMap, layer: &JsValue);

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &MapboxMap, bounds: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = getCanvas)]
    fn get_canvas(this: &MapboxMap) -> web_sys::HtmlCanvasElement;

    #[wasm_bindgen(method)]
    fn remove(this: &MapboxMap);

    #[wasm_bindgen(method)]
    pub fn on(this: &MapboxMap, event: &str, handler: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_layer(
        this: &MapboxMap,
        event: &str,
        layer: &str,
        handler: &Closure<dyn FnMut(JsValue)>,
    );

    #[wasm_bindgen(method, js_name = addControl)]
    fn add_control(this: &MapboxMap, control: &JsValue, position: &str);

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = NavigationControl)]
    type NavigationControl;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "NavigationControl")]
    fn new(options: &JsValue) -> NavigationControl;

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = FullscreenControl)]
    type FullscreenControl;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "FullscreenControl")]
    fn new() -> FullscreenControl;

    type GeoJsonSource;

    #[wasm_bindgen(method, js_name = setData)]
    fn set_data(this: &GeoJsonSource, data: &JsValue);
}

/// Property set on camera calls' event data, and read back from `moveend`.
const SPIN_TAG: &str = "spin";
const FOCUS_TAG: &str = "focus";

pub fn set_access_token(token: &str) {
    let Ok(mapboxgl) = Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl")) else {
        return;
    };
    let _ = Reflect::set(
        &mapboxgl,
        &JsValue::from_str("accessToken"),
        &JsValue::from_str(token),
    );
}

/// Zoom/compass (with pitch) and fullscreen buttons, top right.
pub fn add_default_controls(map: &MapboxMap) {
    let navigation = NavigationControl::new(&to_js(&serde_json::json!({ "visualizePitch": true })));
    map.add_control(&navigation, "top-right");
    map.add_control(&FullscreenControl::new(), "top-right");
}

/// Converts through JSON text; style specs and GeoJSON are plain data.
pub fn to_js(value: &Value) -> JsValue {
    JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn set(target: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn lng_lat(p: LngLat) -> JsValue {
    Array::of2(&JsValue::from_f64(p.lng), &JsValue::from_f64(p.lat)).into()
}

/// Which of our camera calls, if any, started the movement that just ended.
pub fn move_origin(event: &JsValue) -> MoveOrigin {
    if get(event, SPIN_TAG).is_truthy() {
        MoveOrigin::Spin
    } else if get(event, FOCUS_TAG).is_truthy() {
        MoveOrigin::Focus
    } else {
        MoveOrigin::User
    }
}

/// Properties and coordinates of the first feature of a layer click.
pub fn clicked_feature(event: &JsValue) -> Option<(serde_json::Map<String, Value>, LngLat)> {
    let features = get(event, "features");
    if !Array::is_array(&features) {
        return None;
    }
    let first = Array::from(&features).get(0);
    if first.is_undefined() {
        return None;
    }

    if let Ok(original) = get(event, "originalEvent").dyn_into::<web_sys::Event>() {
        original.prevent_default();
        original.stop_propagation();
    }

    let properties = JSON::stringify(&get(&first, "properties"))
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    let coords = get(&get(&first, "geometry"), "coordinates");
    let position = if Array::is_array(&coords) {
        let coords = Array::from(&coords);
        LngLat::new(
            coords.get(0).as_f64().unwrap_or(0.0),
            coords.get(1).as_f64().unwrap_or(0.0),
        )
    } else {
        LngLat::new(0.0, 0.0)
    };
    Some((properties, position))
}

/// [`MapHandle`] over a Mapbox GL JS map.
pub struct MapboxHandle {
    map: MapboxMap,
    linear: Closure<dyn Fn(f64) -> f64>,
    ease_in_out_quad: Closure<dyn Fn(f64) -> f64>,
}

impl MapboxHandle {
    pub fn new(map: MapboxMap) -> Self {
        Self {
            map,
            linear: Closure::<dyn Fn(f64) -> f64>::new(|t: f64| Easing::Linear.apply(t)),
            ease_in_out_quad: Closure::<dyn Fn(f64) -> f64>::new(|t: f64| {
                Easing::EaseInOutQuad.apply(t)
            }),
        }
    }

    fn ease_options(&self, ease: &CameraEase) -> Object {
        let options = Object::new();
        set(&options, "center", &lng_lat(ease.center));
        if let Some(zoom) = ease.zoom {
            set(&options, "zoom", &JsValue::from_f64(zoom));
        }
        set(&options, "duration", &JsValue::from_f64(ease.duration_ms));
        let easing = match ease.easing {
            Easing::Linear => &self.linear,
            Easing::EaseInOutQuad => &self.ease_in_out_quad,
        };
        set(&options, "easing", easing.as_ref());
        set(&options, "essential", &JsValue::from_bool(ease.essential));
        options
    }

    fn event_data(origin: MoveOrigin) -> JsValue {
        let data = Object::new();
        match origin {
            MoveOrigin::Spin => set(&data, SPIN_TAG, &JsValue::TRUE),
            MoveOrigin::Focus => set(&data, FOCUS_TAG, &JsValue::TRUE),
            MoveOrigin::User => {}
        }
        data.into()
    }
}

impl MapHandle for MapboxHandle {
    fn camera(&self) -> CameraPose {
        let center = self.map.get_center();
        CameraPose {
            center: LngLat::new(
                get(&center, "lng").as_f64().unwrap_or(0.0),
                get(&center, "lat").as_f64().unwrap_or(0.0),
            ),
            zoom: self.map.get_zoom(),
            bearing: self.map.get_bearing(),
            pitch: self.map.get_pitch(),
        }
    }

    fn jump_to(&mut self, pose: &CameraPose) {
        let options = Object::new();
        set(&options, "center", &lng_lat(pose.center));
        set(&options, "zoom", &JsValue::from_f64(pose.zoom));
        set(&options, "bearing", &JsValue::from_f64(pose.bearing));
        set(&options, "pitch", &JsValue::from_f64(pose.pitch));
        self.map.jump_to(&options);
    }

    fn ease_to(&mut self, ease: &CameraEase, origin: MoveOrigin) {
        self.map
            .ease_to(&self.ease_options(ease), &Self::event_data(origin));
    }

    fn fly_to(&mut self, ease: &CameraEase, origin: MoveOrigin) {
        self.map
            .fly_to(&self.ease_options(ease), &Self::event_data(origin));
    }

    fn add_source(&mut self, id: &str, data: &Value) {
        let source = serde_json::json!({ "type": "geojson", "data": data });
        self.map.add_source(id, &to_js(&source));
    }

    fn set_source_data(&mut self, id: &str, data: &Value) {
        let source = self.map.get_source(id);
        if source.is_undefined() || source.is_null() {
            return;
        }
        source.unchecked_into::<GeoJsonSource>().set_data(&to_js(data));
    }

    fn add_layer(&mut self, layer: &LayerSpec) {
        self.map.add_layer(&to_js(&layer.to_style_json()));
    }

    fn fit_bounds(&mut self, bounds: &LngLatBounds, padding_px: f64) {
        let bounds = serde_json::json!(bounds.to_array());
        let options = Object::new();
        set(&options, "padding", &JsValue::from_f64(padding_px));
        self.map.fit_bounds(&to_js(&bounds), &options);
    }

    fn set_cursor(&mut self, cursor: &str) {
        let _ = self.map.get_canvas().style().set_property("cursor", cursor);
    }

    fn remove(&mut self) {
        self.map.remove();
    }
}
