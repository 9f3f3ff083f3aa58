//! SVG scene writer.
//!
//! Number formatting mirrors what a browser build of this chart would emit:
//! attribute values use a round-trippable decimal form (like JS
//! `Number#toString()`), path data uses d3-path's three fractional digits.

use std::fmt::Write as _;

use shoal::geom::deg2rad;

use crate::model::ChartLayout;
use crate::session::LINE_ADVANCE;

/// Writes a settled layout as a standalone SVG document.
pub fn render_svg(layout: &ChartLayout) -> String {
    let mut out = String::new();

    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" width=""#);
    fmt_into(&mut out, layout.width);
    out.push_str(r#"" height=""#);
    fmt_into(&mut out, layout.height);
    out.push_str(r#"" viewBox="0 0 "#);
    fmt_into(&mut out, layout.width);
    out.push(' ');
    fmt_into(&mut out, layout.height);
    out.push('"');
    if !layout.background_color.is_empty() {
        out.push_str(r#" style="background-color:"#);
        escape_xml_into(&mut out, &layout.background_color);
        out.push('"');
    }
    out.push_str(">\n");

    for group in &layout.groups {
        out.push_str(r#"<g class="group-label"><text transform="translate("#);
        fmt_into(&mut out, group.label.x);
        out.push_str(", ");
        fmt_into(&mut out, group.label.y);
        out.push_str(r##")" fill="#fff" font-size=""##);
        fmt_into(&mut out, layout.label_font_size);
        out.push_str("\">");
        for (i, line) in group.lines.iter().enumerate() {
            out.push_str(r#"<tspan x="0" dy=""#);
            fmt_into(&mut out, if i == 0 { 0.0 } else { LINE_ADVANCE });
            out.push_str("\">");
            escape_xml_into(&mut out, line);
            out.push_str("</tspan>");
        }
        out.push_str(r#"</text><path class="group" d=""#);
        out.push_str(&group.connector);
        out.push_str(r##"" fill="none" stroke="#fff"/></g>"##);
        out.push('\n');
    }

    for person in &layout.people {
        out.push_str(r#"<circle class="population" r=""#);
        fmt_into(&mut out, layout.mark_radius);
        out.push_str(r#"" cx=""#);
        fmt_into(&mut out, person.x);
        out.push_str(r#"" cy=""#);
        fmt_into(&mut out, person.y);
        out.push_str(r##"" fill="#fff"/>"##);
        out.push('\n');
    }

    out.push_str("</svg>");
    out
}

/// Leader line between a group and its label: a 60 degree arc across the
/// group's rim centered on the label bearing, plus a radial tick. Matches
/// d3-path's `arc`/`moveTo`/`lineTo` output for the same calls.
pub(crate) fn connector_path(x: f64, y: f64, r: f64, label_x: f64, label_y: f64) -> String {
    let rad = (label_y - y).atan2(label_x - x);
    let a0 = rad - deg2rad(30.0);
    let a1 = rad + deg2rad(30.0);

    let mut d = String::new();
    d.push('M');
    fmt_path_into(&mut d, x + r * a0.cos());
    d.push(',');
    fmt_path_into(&mut d, y + r * a0.sin());
    // d3-path skips the arc command entirely for an empty radius.
    if r > 0.0 {
        d.push('A');
        fmt_path_into(&mut d, r);
        d.push(',');
        fmt_path_into(&mut d, r);
        d.push_str(",0,0,1,");
        fmt_path_into(&mut d, x + r * a1.cos());
        d.push(',');
        fmt_path_into(&mut d, y + r * a1.sin());
    }
    d.push('M');
    fmt_path_into(&mut d, (r + 10.0) * rad.cos() + x);
    d.push(',');
    fmt_path_into(&mut d, (r + 10.0) * rad.sin() + y);
    d.push('L');
    fmt_path_into(&mut d, r * rad.cos() + x);
    d.push(',');
    fmt_path_into(&mut d, r * rad.sin() + y);
    d
}

fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }

    let _ = write!(out, "{v}");
}

fn fmt_path_into(out: &mut String, v: f64) {
    // d3-path rounds to three fractional digits, ties half-up even for
    // negative values.
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }

    let k = (v * 1000.0 + 0.5).floor() as i64;
    if k == 0 {
        out.push('0');
        return;
    }

    let neg = k.is_negative();
    let abs = k.unsigned_abs();
    let int_part = abs / 1000;
    let frac = abs % 1000;

    if neg {
        out.push('-');
    }
    let _ = write!(out, "{int_part}");

    if frac == 0 {
        return;
    }
    let digits = [
        b'0' + (frac / 100) as u8,
        b'0' + ((frac / 10) % 10) as u8,
        b'0' + (frac % 10) as u8,
    ];
    let mut end = 3usize;
    while end > 0 && digits[end - 1] == b'0' {
        end -= 1;
    }
    out.push('.');
    for &b in &digits[..end] {
        out.push(b as char);
    }
}

fn escape_xml_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'"' => Some("&quot;"),
            b'\'' => Some("&#39;"),
            _ => None,
        };
        let Some(esc) = esc else {
            continue;
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnchorLayout, GroupLayout, LabelLayout, NodeLayout};

    fn fmt_string(v: f64) -> String {
        let mut s = String::new();
        fmt_into(&mut s, v);
        s
    }

    fn fmt_path_string(v: f64) -> String {
        let mut s = String::new();
        fmt_path_into(&mut s, v);
        s
    }

    #[test]
    fn attribute_numbers_drop_float_noise() {
        assert_eq!(fmt_string(f64::NAN), "0");
        assert_eq!(fmt_string(f64::INFINITY), "0");
        assert_eq!(fmt_string(-0.0), "0");
        assert_eq!(fmt_string(1.0000004), "1");
        assert_eq!(fmt_string(-1.0000004), "-1");
        assert_eq!(fmt_string(12.5), "12.5");
    }

    #[test]
    fn path_numbers_keep_three_digits() {
        assert_eq!(fmt_path_string(f64::NAN), "0");
        assert_eq!(fmt_path_string(0.0004), "0");
        assert_eq!(fmt_path_string(-0.0004), "0");
        assert_eq!(fmt_path_string(1.23456), "1.235");
        assert_eq!(fmt_path_string(1.0), "1");
        assert_eq!(fmt_path_string(-1.2345), "-1.234");
    }

    #[test]
    fn text_is_xml_escaped() {
        let mut out = String::new();
        escape_xml_into(&mut out, r#"<Owned & "rented">"#);
        assert_eq!(out, "&lt;Owned &amp; &quot;rented&quot;>");
    }

    #[test]
    fn connector_arcs_across_the_label_bearing() {
        // Label straight above a group of radius 10 at the origin.
        let d = connector_path(0.0, 0.0, 10.0, 0.0, -20.0);
        assert_eq!(d, "M-5,-8.66A10,10,0,0,1,5,-8.66M0,-20L0,-10");
    }

    #[test]
    fn zero_radius_connector_skips_the_arc() {
        let d = connector_path(0.0, 0.0, 0.0, 30.0, 40.0);
        assert_eq!(d, "M0,0M6,8L0,0");
    }

    #[test]
    fn scene_lists_labels_before_people() {
        let layout = ChartLayout {
            width: 100.0,
            height: 80.0,
            background_color: "#3C6998".to_string(),
            content_color: "rgba(60,105,152,0.85)".to_string(),
            mark_radius: 5.0,
            label_font_size: 12.5,
            groups: vec![GroupLayout {
                name: "Owned & clear".to_string(),
                measure: "housing".to_string(),
                comparison: "2016".to_string(),
                value: 31.0,
                x: 50.0,
                y: 40.0,
                r: 10.0,
                lines: vec!["Owned &".to_string(), "clear".to_string()],
                label: LabelLayout {
                    x: 50.0,
                    y: 10.0,
                    width: 52.5,
                    height: 30.0,
                },
                anchor: AnchorLayout {
                    x: 50.0,
                    y: 40.0,
                    r: 30.0,
                },
                connector: connector_path(50.0, 40.0, 10.0, 50.0, 10.0),
            }],
            people: vec![NodeLayout {
                id: 0,
                group: "Owned & clear".to_string(),
                x: 48.0,
                y: 41.5,
            }],
        };

        let svg = render_svg(&layout);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains(r#"style="background-color:#3C6998""#));
        assert!(svg.contains(r##"<text transform="translate(50, 10)" fill="#fff" font-size="12.5">"##));
        assert!(svg.contains(r#"<tspan x="0" dy="0">Owned &amp;</tspan>"#));
        assert!(svg.contains(r#"<tspan x="0" dy="15">clear</tspan>"#));
        assert!(svg.contains(r##"" fill="none" stroke="#fff"/></g>"##));
        assert!(svg.contains(r##"<circle class="population" r="5" cx="48" cy="41.5" fill="#fff"/>"##));
        let label_at = svg.find("group-label").unwrap();
        let person_at = svg.find("population").unwrap();
        assert!(label_at < person_at);
    }
}
