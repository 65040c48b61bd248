use crate::error::Result;
use crate::models::{MapView, MarkerDescriptor};
use crate::utils::constants::{
    DEFAULT_MAP_HEIGHT_PX, DEFAULT_MAP_TITLE, DEFAULT_POPUP_MAX_WIDTH_PX, NO_RESULTS_MESSAGE,
};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

const SEARCH_LABEL: &str = "🔎 Buscar (nombre, cuenta, medidor, municipio, marca)";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{TITLE}}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://netdna.bootstrapcdn.com/bootstrap/3.0.0/css/bootstrap-glyphicons.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
<style>
body { font-family: sans-serif; margin: 0 1.5rem 1.5rem; }
#search { width: 100%; padding: 8px; font-size: 1rem; box-sizing: border-box; }
#map { width: 100%; height: {{HEIGHT}}px; }
.notice { padding: 10px 14px; border-radius: 5px; margin: 10px 0; display: none; }
.notice.warning { background: #fff3cd; color: #664d03; }
.notice.error { background: #f8d7da; color: #58151c; }
.go-button { padding: 6px 10px; background: #1f77b4; color: white !important; text-decoration: none; border-radius: 5px; }
footer { color: #777; font-size: 0.8rem; margin-top: 8px; }
</style>
</head>
<body>
<h1>{{TITLE}}</h1>
{{CONTROLS}}
<div id="warning" class="notice warning"></div>
<div id="error" class="notice error"></div>
<div id="map"></div>
{{FOOTER}}
<script>
const POPUP_MAX_WIDTH = {{POPUP_WIDTH}};
let map = null;
let layer = null;

function showNotice(id, text) {
  const el = document.getElementById(id);
  el.textContent = text || "";
  el.style.display = text ? "block" : "none";
}

function drawView(view) {
  showNotice("warning", "");
  showNotice("error", "");
  document.getElementById("map").style.display = "block";
  if (map === null) {
    map = L.map("map");
    L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
      maxZoom: 19,
      attribution: "&copy; OpenStreetMap contributors"
    }).addTo(map);
  }
  if (layer !== null) {
    layer.remove();
  }
  layer = L.layerGroup().addTo(map);
  map.setView([view.center_lat, view.center_lon], view.zoom);
  const icon = L.AwesomeMarkers.icon({ icon: "flash", prefix: "glyphicon", markerColor: "green" });
  for (const m of view.markers) {
    L.marker([m.latitude, m.longitude], { icon: icon })
      .bindTooltip(m.tooltip_html)
      .bindPopup(m.popup_html, { maxWidth: POPUP_MAX_WIDTH })
      .addTo(layer);
  }
}

function showNoResults(message) {
  document.getElementById("map").style.display = "none";
  showNotice("error", "");
  showNotice("warning", "⚠️ " + message);
}

function showError(message) {
  document.getElementById("map").style.display = "none";
  showNotice("warning", "");
  showNotice("error", message);
}

{{BOOTSTRAP}}
</script>
</body>
</html>
"#;

const SEARCH_CONTROLS: &str = r#"<label for="search">{{LABEL}}</label>
<input id="search" type="text" value="" autocomplete="off">"#;

const INTERACTIVE_BOOTSTRAP: &str = r#"async function refresh() {
  const q = document.getElementById("search").value;
  try {
    const response = await fetch("/api/view?q=" + encodeURIComponent(q));
    const body = await response.json();
    if (body.status === "ok") {
      drawView(body);
    } else if (body.status === "no_results") {
      showNoResults(body.message);
    } else {
      showError(body.message);
    }
  } catch (err) {
    showError(String(err));
  }
}

let pending = null;
document.getElementById("search").addEventListener("input", function () {
  clearTimeout(pending);
  pending = setTimeout(refresh, 300);
});
refresh();"#;

/// Marker as sent to the page, with tooltip and popup already escaped.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub tooltip_html: String,
    pub popup_html: String,
    pub link_url: String,
}

/// Map view as sent to the page.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub markers: Vec<RenderedMarker>,
}

impl From<&MapView> for RenderedView {
    fn from(view: &MapView) -> Self {
        Self {
            center_lat: view.center_lat,
            center_lon: view.center_lon,
            zoom: view.zoom,
            markers: view.markers.iter().map(RenderedMarker::from).collect(),
        }
    }
}

impl From<&MarkerDescriptor> for RenderedMarker {
    fn from(marker: &MarkerDescriptor) -> Self {
        Self {
            latitude: marker.latitude,
            longitude: marker.longitude,
            tooltip_html: escape_html(&marker.tooltip),
            popup_html: popup_html(marker),
            link_url: marker.link_url.clone(),
        }
    }
}

/// Leaflet page rendering for map views.
#[derive(Debug, Clone)]
pub struct HtmlWriter {
    title: String,
    map_height_px: u32,
    popup_max_width_px: u32,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_MAP_TITLE.to_string(),
            map_height_px: DEFAULT_MAP_HEIGHT_PX,
            popup_max_width_px: DEFAULT_POPUP_MAX_WIDTH_PX,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_map_height(mut self, height_px: u32) -> Self {
        self.map_height_px = height_px;
        self
    }

    pub fn with_popup_max_width(mut self, width_px: u32) -> Self {
        self.popup_max_width_px = width_px;
        self
    }

    /// Page served by the interactive server. Markers are fetched per search.
    pub fn render_interactive(&self) -> String {
        let controls = SEARCH_CONTROLS.replace("{{LABEL}}", &escape_html(SEARCH_LABEL));
        self.fill_template(&controls, "", INTERACTIVE_BOOTSTRAP)
    }

    /// Self-contained page with the markers of one view embedded.
    pub fn render_static(&self, view: &MapView, query: &str) -> Result<String> {
        let payload = script_safe_json(&RenderedView::from(view))?;
        let bootstrap = format!("drawView({});", payload);

        let mut caption = format!("{} marcadores", view.marker_count());
        if !query.trim().is_empty() {
            caption.push_str(&format!(" para \"{}\"", query.trim()));
        }
        let footer = format!(
            "<footer>{} &middot; generado {}</footer>",
            escape_html(&caption),
            Local::now().format("%Y-%m-%d %H:%M")
        );

        Ok(self.fill_template("", &footer, &bootstrap))
    }

    /// Write a static page to disk, creating parent directories as needed.
    pub fn write_static(&self, view: &MapView, query: &str, path: &Path) -> Result<()> {
        let html = self.render_static(view, query)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, html)?;

        info!(path = %path.display(), markers = view.marker_count(), "Map written");
        Ok(())
    }

    fn fill_template(&self, controls: &str, footer: &str, bootstrap: &str) -> String {
        let title = escape_html(&self.title);
        let height = self.map_height_px.to_string();
        let popup_width = self.popup_max_width_px.to_string();

        render_placeholders(PAGE_TEMPLATE, |key| match key {
            "TITLE" => Some(title.as_str()),
            "HEIGHT" => Some(height.as_str()),
            "POPUP_WIDTH" => Some(popup_width.as_str()),
            "CONTROLS" => Some(controls),
            "FOOTER" => Some(footer),
            "BOOTSTRAP" => Some(bootstrap),
            _ => None,
        })
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitute `{{KEY}}` placeholders in a single pass.
///
/// Substituted values are never scanned again, so record or query text that
/// happens to look like a placeholder stays literal. Unknown keys are kept.
fn render_placeholders<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        match after_open.find("}}") {
            Some(end) => match lookup(&after_open[..end]) {
                Some(value) => {
                    output.push_str(value);
                    rest = &after_open[end + 2..];
                }
                None => {
                    output.push_str("{{");
                    rest = after_open;
                }
            },
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}

/// Popup block: bold name, details, and the Google Maps button.
pub fn popup_html(marker: &MarkerDescriptor) -> String {
    let popup = &marker.popup;
    format!(
        "<b>{}</b><br>\
         Cuenta: {}<br>\
         Municipio: {}<br>\
         Medidor: {}<br>\
         Marca: {}<br><br>\
         <a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"go-button\">IR (Google Maps)</a>",
        escape_html(&popup.name),
        escape_html(&popup.account),
        escape_html(&popup.municipality),
        escape_html(&popup.meter_number),
        escape_html(&popup.meter_brand),
        escape_html(&marker.link_url),
    )
}

/// Message shown when a search matches nothing
pub fn no_results_message() -> &'static str {
    NO_RESULTS_MESSAGE
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON that can sit inside a `<script>` element.
fn script_safe_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
