//! Map View Component
//!
//! Leaflet map with category markers, a picked-location marker and
//! viewport reporting.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::components::display::dollars;
use crate::leaflet::{self, ControlOptions, DivIconOptions, MapOptions, TileOptions};
use crate::listing::shows_marker;
use crate::models::{BoundingBox, Category, LatLng, Request, Status};

/// Suppresses viewport notifications when the edges did not change
#[derive(Debug, Default)]
pub struct BoundsTracker {
    last_key: Option<String>,
}

impl BoundsTracker {
    /// True if `bbox` differs from the last reported one
    pub fn observe(&mut self, bbox: &BoundingBox) -> bool {
        let key = bbox.key();
        if self.last_key.as_deref() == Some(key.as_str()) {
            return false;
        }
        self.last_key = Some(key);
        true
    }
}

/// Filled circle in the category colour
pub fn category_icon(category: Category) -> DivIconOptions {
    DivIconOptions {
        class_name: "category-marker",
        html: format!(
            "<div class=\"category-marker-dot\" style=\"background: {};\"></div>",
            category.color()
        ),
        icon_size: [28, 28],
        icon_anchor: [14, 14],
    }
}

/// What one rendered marker depends on: position, icon and popup text
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerKey {
    id: String,
    status: Status,
    category: Category,
    location: LatLng,
    funded_amount: f64,
    funding_goal: f64,
}

/// Keys of the markers that should be on the map, in render order
pub fn marker_keys(requests: &[Request], selected: Option<&str>) -> Vec<MarkerKey> {
    requests
        .iter()
        .filter(|r| shows_marker(r, selected))
        .map(|r| MarkerKey {
            id: r.id.clone(),
            status: r.status,
            category: r.category,
            location: r.location(),
            funded_amount: r.funded_amount,
            funding_goal: r.funding_goal,
        })
        .collect()
}

pub fn popup_html(request: &Request) -> String {
    format!(
        "<span class=\"popup-category\">{}</span><br/><span class=\"popup-funding\">{} / {}</span>",
        request.category.as_str(),
        dollars(request.funded_amount),
        dollars(request.funding_goal)
    )
}

/// Live Leaflet objects plus the JS closures they call back into
struct MapHandle {
    map: leaflet::Map,
    markers: leaflet::LayerGroup,
    picked: Option<leaflet::Marker>,
    /// Markers currently drawn; None before the first render
    rendered: Option<Vec<MarkerKey>>,
    _map_listeners: Vec<Closure<dyn FnMut(JsValue)>>,
    marker_listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl MapHandle {
    fn render_markers(&mut self, requests: &[Request], selected: Option<&str>, on_select: Callback<String>) {
        // Unchanged markers keep their open popups and listeners
        let keys = marker_keys(requests, selected);
        if self.rendered.as_ref() == Some(&keys) {
            return;
        }
        self.rendered = Some(keys);

        self.markers.clear_layers();
        self.marker_listeners.clear();

        let target: &JsValue = self.markers.as_ref();
        for request in requests.iter().filter(|r| shows_marker(r, selected)) {
            let icon = leaflet::div_icon(&leaflet::to_options(&category_icon(request.category)));
            let marker = leaflet::marker(
                &leaflet::lat_lng(request.location()),
                &leaflet::marker_with_icon(&icon),
            );
            marker.bind_popup(&popup_html(request));

            let id = request.id.clone();
            let listener = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
                on_select.run(id.clone());
            });
            marker.on_marker("click", listener.as_ref().unchecked_ref());
            marker.add_to(target);
            self.marker_listeners.push(listener);
        }
    }

    fn render_picked(&mut self, picked: Option<LatLng>) {
        if let Some(old) = self.picked.take() {
            old.remove_layer();
        }
        if let Some(point) = picked {
            let marker = leaflet::marker(&leaflet::lat_lng(point), &JsValue::UNDEFINED);
            marker.bind_popup("Selected request location");
            marker.add_to(self.map.as_ref());
            self.picked = Some(marker);
        }
    }
}

/// Full-screen map
#[component]
pub fn MapView(
    #[prop(into)] requests: Signal<Vec<Request>>,
    #[prop(into)] selected: Signal<Option<String>>,
    #[prop(into)] picked: Signal<Option<LatLng>>,
    center: LatLng,
    zoom: u8,
    #[prop(into)] tile_url: String,
    #[prop(into)] tile_attribution: String,
    #[prop(into)] on_bounds_change: Callback<BoundingBox>,
    #[prop(into)] on_pick: Callback<LatLng>,
    #[prop(into)] on_select: Callback<String>,
) -> impl IntoView {
    let container = NodeRef::<leptos::html::Div>::new();
    let handle = StoredValue::new_local(None::<MapHandle>);
    let (ready, set_ready) = signal(false);

    // Create the map once the container is in the DOM
    Effect::new(move |_| {
        let Some(element) = container.get() else {
            return;
        };
        if handle.with_value(|h| h.is_some()) {
            return;
        }

        let map = leaflet::create_map(&element, &leaflet::to_options(&MapOptions { zoom_control: false }));
        map.set_view(&leaflet::lat_lng(center), f64::from(zoom));
        leaflet::tile_layer(&tile_url, &leaflet::to_options(&TileOptions { attribution: &tile_attribution }))
            .add_to(map.as_ref());
        leaflet::zoom_control(&leaflet::to_options(&ControlOptions { position: "bottomright" }))
            .add_to(map.as_ref());
        let markers = leaflet::layer_group();
        markers.add_to(map.as_ref());

        // Report the viewport once it settles, and once at mount
        let tracker = Rc::new(RefCell::new(BoundsTracker::default()));
        let report_bounds = {
            let map = map.clone();
            let tracker = Rc::clone(&tracker);
            move || {
                let bbox = leaflet::bounding_box(&map);
                if tracker.borrow_mut().observe(&bbox) {
                    log::debug!("[MAP] viewport {}", bbox.key());
                    on_bounds_change.run(bbox);
                }
            }
        };
        report_bounds();
        let on_moveend = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| report_bounds());
        map.on("moveend", on_moveend.as_ref().unchecked_ref());

        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            if let Some(point) = leaflet::event_lat_lng(&event) {
                on_pick.run(point);
            }
        });
        map.on("click", on_click.as_ref().unchecked_ref());

        handle.set_value(Some(MapHandle {
            map,
            markers,
            picked: None,
            rendered: None,
            _map_listeners: vec![on_moveend, on_click],
            marker_listeners: Vec::new(),
        }));
        set_ready.set(true);
    });

    Effect::new(move |_| {
        if !ready.get() {
            return;
        }
        let requests = requests.get();
        let selected = selected.get();
        handle.update_value(|h| {
            if let Some(h) = h.as_mut() {
                h.render_markers(&requests, selected.as_deref(), on_select);
            }
        });
    });

    Effect::new(move |_| {
        if !ready.get() {
            return;
        }
        let picked = picked.get();
        handle.update_value(|h| {
            if let Some(h) = h.as_mut() {
                h.render_picked(picked);
            }
        });
    });

    on_cleanup(move || {
        handle.update_value(|h| {
            if let Some(h) = h.take() {
                h.map.remove();
            }
        });
    });

    view! { <div class="map-container" node_ref=container></div> }
}
