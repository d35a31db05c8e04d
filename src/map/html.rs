//! Leaflet page template for [`FacilityMap`](super::FacilityMap).

use crate::domain::Coordinate;

const LEAFLET_VERSION: &str = "1.9.4";

/// Escape text for use inside HTML element content or quoted attributes
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep serialized JSON from closing the surrounding `<script>` element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub fn render_page(title: &str, center: Coordinate, zoom: u8, markers_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
    <style>
        html, body, #map {{ height: 100%; margin: 0; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        const markers = {markers};
        const map = L.map("map").setView([{lat}, {lon}], {zoom});
        L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
            maxZoom: 19,
            attribution: "&copy; OpenStreetMap contributors"
        }}).addTo(map);
        for (const m of markers) {{
            const origin = m.kind === "origin";
            const pin = L.circleMarker([m.lat, m.lon], {{
                radius: origin ? 10 : 8,
                color: origin ? "{origin_color}" : "{facility_color}",
                fillOpacity: 0.8
            }}).bindTooltip(m.tooltip);
            if (m.popup) {{
                pin.bindPopup(m.popup);
            }}
            pin.addTo(map);
        }}
    </script>
</body>
</html>
"#,
        title = html_escape(title),
        version = LEAFLET_VERSION,
        markers = script_safe(markers_json),
        lat = center.lat,
        lon = center.lon,
        zoom = zoom,
        origin_color = super::MarkerKind::Origin.color(),
        facility_color = super::MarkerKind::Facility.color(),
    )
}
