//! Leaflet Bindings
//!
//! Minimal wasm-bindgen surface over the global `L` object loaded by index.html.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::models::{BoundingBox, LatLng};

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type Map;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    pub fn create_map(element: &web_sys::HtmlElement, options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &Map, center: &JsValue, zoom: f64) -> Map;

    #[wasm_bindgen(method, js_name = getBounds)]
    pub fn get_bounds(this: &Map) -> LatLngBounds;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, handler: &js_sys::Function) -> Map;

    #[wasm_bindgen(method)]
    pub fn remove(this: &Map) -> Map;

    #[derive(Debug, Clone)]
    pub type LatLngBounds;

    #[wasm_bindgen(method, js_name = getSouth)]
    pub fn get_south(this: &LatLngBounds) -> f64;

    #[wasm_bindgen(method, js_name = getWest)]
    pub fn get_west(this: &LatLngBounds) -> f64;

    #[wasm_bindgen(method, js_name = getNorth)]
    pub fn get_north(this: &LatLngBounds) -> f64;

    #[wasm_bindgen(method, js_name = getEast)]
    pub fn get_east(this: &LatLngBounds) -> f64;

    #[derive(Debug, Clone)]
    pub type Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Layer, target: &JsValue) -> Layer;

    #[wasm_bindgen(method, js_name = remove)]
    pub fn remove_layer(this: &Layer) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    #[derive(Debug, Clone)]
    #[wasm_bindgen(extends = Layer)]
    pub type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    pub fn layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    pub fn clear_layers(this: &LayerGroup) -> LayerGroup;

    #[derive(Debug, Clone)]
    #[wasm_bindgen(extends = Layer)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    pub fn marker(latlng: &JsValue, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Marker, html: &str) -> Marker;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_marker(this: &Marker, event: &str, handler: &js_sys::Function) -> Marker;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = zoom)]
    pub fn zoom_control(options: &JsValue) -> Layer;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub zoom_control: bool,
}

#[derive(Serialize)]
pub struct TileOptions<'a> {
    pub attribution: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivIconOptions {
    pub class_name: &'static str,
    pub html: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
}

#[derive(Serialize)]
pub struct ControlOptions {
    pub position: &'static str,
}

/// Plain `{...}` options object for a Leaflet factory
pub fn to_options<T: Serialize>(options: &T) -> JsValue {
    serde_wasm_bindgen::to_value(options).unwrap_or(JsValue::UNDEFINED)
}

/// `[lat, lng]` array accepted wherever Leaflet wants a LatLng
pub fn lat_lng(point: LatLng) -> JsValue {
    let array = js_sys::Array::new();
    array.push(&JsValue::from_f64(point.lat));
    array.push(&JsValue::from_f64(point.lng));
    array.into()
}

/// Read the four edges of the current viewport
pub fn bounding_box(map: &Map) -> BoundingBox {
    let bounds = map.get_bounds();
    BoundingBox {
        south: bounds.get_south(),
        west: bounds.get_west(),
        north: bounds.get_north(),
        east: bounds.get_east(),
    }
}

/// `event.latlng` of a Leaflet mouse event
pub fn event_lat_lng(event: &JsValue) -> Option<LatLng> {
    let latlng = js_sys::Reflect::get(event, &JsValue::from_str("latlng")).ok()?;
    let lat = js_sys::Reflect::get(&latlng, &JsValue::from_str("lat")).ok()?.as_f64()?;
    let lng = js_sys::Reflect::get(&latlng, &JsValue::from_str("lng")).ok()?.as_f64()?;
    Some(LatLng { lat, lng })
}

/// Marker options carrying a prebuilt icon
pub fn marker_with_icon(icon: &JsValue) -> JsValue {
    let options = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&options, &JsValue::from_str("icon"), icon);
    options.into()
}
