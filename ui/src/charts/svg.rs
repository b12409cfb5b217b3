//! SVG serialisation of a laid-out [`Figure`].

use std::fmt::Write;

use super::layout::{Figure, Shape};

const FONT_FAMILY: &str = "Inter, 'Segoe UI', Arial, sans-serif";

/// Escapes the five XML special characters.
pub fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn title(tooltip: &Option<String>) -> String {
    tooltip
        .as_deref()
        .map(|text| format!("<title>{}</title>", escape_xml(text)))
        .unwrap_or_default()
}

impl Figure {
    /// Standalone SVG document. Also what the dashboard inlines into the page.
    pub fn to_svg(&self) -> String {
        let (width, height) = (self.width, self.height);
        let mut out = String::new();
        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\" font-family=\"{FONT_FAMILY}\">"
        );
        let _ = write!(out, "<rect width=\"{width}\" height=\"{height}\" fill=\"#ffffff\"/>");

        for shape in &self.shapes {
            // Writing into a String cannot fail.
            let _ = match shape {
                Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    tooltip,
                } => write!(
                    out,
                    "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" \
                     fill=\"{fill}\">{}</rect>",
                    title(tooltip)
                ),
                Shape::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke,
                } => write!(
                    out,
                    "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" \
                     stroke=\"{stroke}\" stroke-width=\"1\"/>"
                ),
                Shape::Polyline {
                    points,
                    stroke,
                    width,
                } => {
                    let coords = points
                        .iter()
                        .map(|(x, y)| format!("{x:.2},{y:.2}"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    write!(
                        out,
                        "<polyline points=\"{coords}\" fill=\"none\" stroke=\"{stroke}\" \
                         stroke-width=\"{width}\" stroke-linejoin=\"round\"/>"
                    )
                }
                Shape::Circle {
                    cx,
                    cy,
                    r,
                    fill,
                    tooltip,
                } => write!(
                    out,
                    "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r}\" fill=\"{fill}\">{}</circle>",
                    title(tooltip)
                ),
                Shape::Path { d, fill, tooltip } => write!(
                    out,
                    "<path d=\"{d}\" fill=\"{fill}\" stroke=\"#ffffff\" stroke-width=\"1\">{}</path>",
                    title(tooltip)
                ),
                Shape::Text {
                    x,
                    y,
                    content,
                    size,
                    anchor,
                    rotate,
                    fill,
                } => {
                    let transform = if *rotate == 0.0 {
                        String::new()
                    } else {
                        format!(" transform=\"rotate({rotate} {x:.2} {y:.2})\"")
                    };
                    write!(
                        out,
                        "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{size}\" fill=\"{fill}\" \
                         text-anchor=\"{}\"{transform}>{}</text>",
                        anchor.as_svg(),
                        escape_xml(content)
                    )
                }
            };
        }

        out.push_str("</svg>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::layout::Anchor;

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml("Bali & Nusa <Tenggara>"), "Bali &amp; Nusa &lt;Tenggara&gt;");
    }

    #[test]
    fn renders_shapes_with_tooltips() {
        let figure = Figure {
            width: 100.0,
            height: 50.0,
            shapes: vec![
                Shape::Rect {
                    x: 1.0,
                    y: 2.0,
                    width: 10.0,
                    height: 20.0,
                    fill: "#636efa".into(),
                    tooltip: Some("Jawa: 4M".into()),
                },
                Shape::Text {
                    x: 5.0,
                    y: 5.0,
                    content: "Mahasiswa".into(),
                    size: 12.0,
                    anchor: Anchor::Middle,
                    rotate: -90.0,
                    fill: "#2a3f5f".into(),
                },
            ],
        };
        let svg = figure.to_svg();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<title>Jawa: 4M</title>"));
        assert!(svg.contains("rotate(-90 5.00 5.00)"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }
}
