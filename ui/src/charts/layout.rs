//! Geometry: places a [`ChartSpec`] on a fixed canvas as a list of primitive shapes.

use std::f64::consts::{PI, TAU};

use crate::core::format::format_tick;

use super::spec::{ChartData, ChartSpec, Datum, SeriesPoint};

pub const WIDTH: f64 = 640.0;
pub const HEIGHT: f64 = 360.0;

/// Categorical colour cycle.
pub const PALETTE: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

const AXIS_COLOR: &str = "#444444";
const GRID_COLOR: &str = "#e5ecf6";
const TEXT_COLOR: &str = "#2a3f5f";

const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 64.0;

/// Smallest pie slice (as a share of the whole) that still gets a percentage label.
const MIN_LABELLED_SLICE: f64 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
        tooltip: Option<String>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: String,
        width: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        tooltip: Option<String>,
    },
    Path {
        d: String,
        fill: String,
        tooltip: Option<String>,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        anchor: Anchor,
        /// Degrees, clockwise, around `(x, y)`.
        rotate: f64,
        fill: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<Shape>,
}

impl Figure {
    fn new() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            shapes: Vec::new(),
        }
    }

    fn text(&mut self, x: f64, y: f64, content: impl Into<String>, size: f64, anchor: Anchor) {
        self.shapes.push(Shape::Text {
            x,
            y,
            content: content.into(),
            size,
            anchor,
            rotate: 0.0,
            fill: TEXT_COLOR.to_string(),
        });
    }

    /// Number of shapes of the filled kinds (bars, tiles, slices, markers).
    pub fn mark_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|shape| {
                matches!(
                    shape,
                    Shape::Rect { tooltip: Some(_), .. }
                        | Shape::Path { tooltip: Some(_), .. }
                        | Shape::Circle { tooltip: Some(_), .. }
                )
            })
            .count()
    }
}

pub fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// A value axis with round tick spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Axis {
    pub fn ticks(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step).round() as usize;
        (0..=count).map(|i| self.min + self.step * i as f64).collect()
    }

    /// Maps `value` linearly from `[min, max]` onto `[from, to]`.
    pub fn scale(&self, value: f64, from: f64, to: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return from;
        }
        from + (value - self.min) / span * (to - from)
    }
}

/// Expands `[lo, hi]` outwards to multiples of a 1, 2 or 5 × 10ⁿ step giving
/// roughly `target` intervals.
pub fn nice_axis(lo: f64, hi: f64, target: usize) -> Axis {
    let (mut lo, mut hi) = if lo.is_finite() && hi.is_finite() {
        (lo.min(hi), lo.max(hi))
    } else {
        (0.0, 1.0)
    };
    if hi - lo < f64::EPSILON {
        if hi == 0.0 {
            hi = 1.0;
        } else {
            let pad = hi.abs() * 0.1;
            lo -= pad;
            hi += pad;
        }
    }
    let step = nice_step((hi - lo) / target.max(1) as f64);
    Axis {
        min: (lo / step).floor() * step,
        max: (hi / step).ceil() * step,
        step,
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

pub fn layout(spec: &ChartSpec) -> Figure {
    let mut figure = Figure::new();
    match &spec.data {
        ChartData::Categories(points) => bars(&mut figure, spec, points),
        ChartData::Leaves(leaves) => treemap(&mut figure, leaves),
        ChartData::Slices(slices) => pie(&mut figure, slices, spec.hole),
        ChartData::Series(points) => line(&mut figure, spec, points),
    }
    figure
}

struct Plot {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Plot {
    fn standard() -> Self {
        Self {
            left: MARGIN_LEFT,
            right: WIDTH - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: HEIGHT - MARGIN_BOTTOM,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Horizontal grid lines, tick labels and axis titles shared by bar and line charts.
fn value_frame(figure: &mut Figure, plot: &Plot, axis: &Axis, spec: &ChartSpec) {
    for tick in axis.ticks() {
        let y = axis.scale(tick, plot.bottom, plot.top);
        figure.shapes.push(Shape::Line {
            x1: plot.left,
            y1: y,
            x2: plot.right,
            y2: y,
            stroke: GRID_COLOR.to_string(),
        });
        figure.text(plot.left - 6.0, y + 4.0, format_tick(tick), 11.0, Anchor::End);
    }
    figure.shapes.push(Shape::Line {
        x1: plot.left,
        y1: plot.bottom,
        x2: plot.right,
        y2: plot.bottom,
        stroke: AXIS_COLOR.to_string(),
    });

    if let Some(title) = spec.x_label.as_deref().filter(|title| !title.is_empty()) {
        figure.text(
            (plot.left + plot.right) / 2.0,
            HEIGHT - 8.0,
            title,
            12.0,
            Anchor::Middle,
        );
    }
    if let Some(title) = spec.y_label.as_deref().filter(|title| !title.is_empty()) {
        figure.shapes.push(Shape::Text {
            x: 16.0,
            y: (plot.top + plot.bottom) / 2.0,
            content: title.to_string(),
            size: 12.0,
            anchor: Anchor::Middle,
            rotate: -90.0,
            fill: TEXT_COLOR.to_string(),
        });
    }
}

fn bars(figure: &mut Figure, spec: &ChartSpec, points: &[Datum]) {
    let plot = Plot::standard();
    let lo = points.iter().map(|p| p.value).fold(0.0, f64::min);
    let hi = points.iter().map(|p| p.value).fold(0.0, f64::max);
    let axis = nice_axis(lo, hi, 5);
    value_frame(figure, &plot, &axis, spec);

    if points.is_empty() {
        return;
    }
    let band = plot.width() / points.len() as f64;
    let bar_width = band * 0.8;
    let zero = axis.scale(0.0, plot.bottom, plot.top);
    // Long labels in narrow bands are tilted so neighbours do not overlap.
    let crowded = points
        .iter()
        .any(|p| p.label.chars().count() as f64 * 6.5 > band);

    for (index, point) in points.iter().enumerate() {
        let center = plot.left + band * (index as f64 + 0.5);
        let top = axis.scale(point.value, plot.bottom, plot.top);
        figure.shapes.push(Shape::Rect {
            x: center - bar_width / 2.0,
            y: top.min(zero),
            width: bar_width,
            height: (zero - top).abs(),
            fill: PALETTE[0].to_string(),
            tooltip: Some(format!("{}: {}", point.label, format_tick(point.value))),
        });

        if spec.show_text {
            if let Some(text) = &point.text {
                figure.text(center, top.min(zero) - 6.0, text.clone(), 12.0, Anchor::Middle);
            }
        }

        if crowded {
            figure.shapes.push(Shape::Text {
                x: center,
                y: plot.bottom + 14.0,
                content: point.label.clone(),
                size: 11.0,
                anchor: Anchor::End,
                rotate: -30.0,
                fill: TEXT_COLOR.to_string(),
            });
        } else {
            figure.text(center, plot.bottom + 16.0, point.label.clone(), 11.0, Anchor::Middle);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Squarified tiling of `bounds`, one tile per value, in input order.
/// Values should be positive and sorted descending.
pub fn squarify(values: &[f64], bounds: Tile) -> Vec<Tile> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let scale = bounds.width * bounds.height / total;
    let areas: Vec<f64> = values.iter().map(|value| value * scale).collect();

    let mut tiles = Vec::with_capacity(areas.len());
    let mut free = bounds;
    let mut start = 0;
    while start < areas.len() {
        let side = free.width.min(free.height);
        let mut end = start + 1;
        let mut best = worst_ratio(&areas[start..end], side);
        while end < areas.len() {
            let candidate = worst_ratio(&areas[start..=end], side);
            if candidate > best {
                break;
            }
            best = candidate;
            end += 1;
        }

        let row = &areas[start..end];
        let row_area: f64 = row.iter().sum();
        if free.width >= free.height {
            let column = if free.height > 0.0 { row_area / free.height } else { 0.0 };
            let mut y = free.y;
            for area in row {
                let height = if column > 0.0 { area / column } else { 0.0 };
                tiles.push(Tile { x: free.x, y, width: column, height });
                y += height;
            }
            free.x += column;
            free.width -= column;
        } else {
            let strip = if free.width > 0.0 { row_area / free.width } else { 0.0 };
            let mut x = free.x;
            for area in row {
                let width = if strip > 0.0 { area / strip } else { 0.0 };
                tiles.push(Tile { x, y: free.y, width, height: strip });
                x += width;
            }
            free.y += strip;
            free.height -= strip;
        }
        start = end;
    }
    tiles
}

fn worst_ratio(row: &[f64], side: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max = row.iter().copied().fold(f64::MIN, f64::max);
    let min = row.iter().copied().fold(f64::MAX, f64::min);
    let side_sq = side * side;
    let sum_sq = sum * sum;
    (side_sq * max / sum_sq).max(sum_sq / (side_sq * min))
}

fn descending(data: &[Datum]) -> Vec<&Datum> {
    let mut sorted: Vec<&Datum> = data.iter().filter(|d| d.value > 0.0).collect();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    sorted
}

fn treemap(figure: &mut Figure, leaves: &[Datum]) {
    let leaves = descending(leaves);
    let values: Vec<f64> = leaves.iter().map(|leaf| leaf.value).collect();
    let bounds = Tile {
        x: 4.0,
        y: 4.0,
        width: WIDTH - 8.0,
        height: HEIGHT - 8.0,
    };

    for (index, (leaf, tile)) in leaves.iter().zip(squarify(&values, bounds)).enumerate() {
        figure.shapes.push(Shape::Rect {
            x: tile.x + 1.0,
            y: tile.y + 1.0,
            width: (tile.width - 2.0).max(0.0),
            height: (tile.height - 2.0).max(0.0),
            fill: color(index).to_string(),
            tooltip: Some(format!("{}: {}", leaf.label, format_tick(leaf.value))),
        });
        if tile.width > 48.0 && tile.height > 22.0 {
            figure.text(tile.x + 8.0, tile.y + 18.0, leaf.label.clone(), 12.0, Anchor::Start);
        }
        if tile.width > 48.0 && tile.height > 40.0 {
            figure.text(
                tile.x + 8.0,
                tile.y + 34.0,
                format_tick(leaf.value),
                11.0,
                Anchor::Start,
            );
        }
    }
}

/// Point on a circle at `angle` radians clockwise from twelve o'clock.
fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Annular sector between `start` and `end` (clockwise, under a full turn).
fn sector_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, end: f64) -> String {
    let large = if end - start > PI { 1 } else { 0 };
    let (ox0, oy0) = polar(cx, cy, outer, start);
    let (ox1, oy1) = polar(cx, cy, outer, end);
    if inner <= 0.0 {
        return format!(
            "M {cx:.2} {cy:.2} L {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large} 1 {ox1:.2} {oy1:.2} Z"
        );
    }
    let (ix1, iy1) = polar(cx, cy, inner, end);
    let (ix0, iy0) = polar(cx, cy, inner, start);
    format!(
        "M {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large} 1 {ox1:.2} {oy1:.2} \
         L {ix1:.2} {iy1:.2} A {inner:.2} {inner:.2} 0 {large} 0 {ix0:.2} {iy0:.2} Z"
    )
}

fn pie(figure: &mut Figure, slices: &[Datum], hole: f64) {
    let slices = descending(slices);
    let total: f64 = slices.iter().map(|slice| slice.value).sum();
    if total <= 0.0 {
        return;
    }

    let cx = WIDTH * 0.4;
    let cy = HEIGHT / 2.0;
    let outer = HEIGHT / 2.0 - 24.0;
    let inner = outer * hole;

    let mut start = 0.0;
    for (index, slice) in slices.iter().enumerate() {
        let share = slice.value / total;
        let end = start + share * TAU;
        let fill = color(index).to_string();
        let tooltip = Some(format!("{}: {}", slice.label, format_tick(slice.value)));

        // An SVG arc cannot close on itself, so a whole disc is two halves.
        let spans = if share >= 1.0 - 1e-9 {
            vec![(0.0, PI), (PI, TAU)]
        } else {
            vec![(start, end)]
        };
        for (from, to) in spans {
            figure.shapes.push(Shape::Path {
                d: sector_path(cx, cy, outer, inner, from, to),
                fill: fill.clone(),
                tooltip: tooltip.clone(),
            });
        }

        if share >= MIN_LABELLED_SLICE {
            let (lx, ly) = polar(cx, cy, (outer + inner) / 2.0, (start + end) / 2.0);
            figure.shapes.push(Shape::Text {
                x: lx,
                y: ly + 4.0,
                content: format!("{:.1}%", share * 100.0),
                size: 12.0,
                anchor: Anchor::Middle,
                rotate: 0.0,
                fill: "#ffffff".to_string(),
            });
        }

        let legend_y = 40.0 + index as f64 * 22.0;
        figure.shapes.push(Shape::Rect {
            x: WIDTH * 0.78,
            y: legend_y - 10.0,
            width: 12.0,
            height: 12.0,
            fill: color(index).to_string(),
            tooltip: None,
        });
        figure.text(WIDTH * 0.78 + 18.0, legend_y, slice.label.clone(), 12.0, Anchor::Start);

        start = end;
    }
}

fn line(figure: &mut Figure, spec: &ChartSpec, points: &[SeriesPoint]) {
    let plot = Plot::standard();
    let lo = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let axis = nice_axis(lo, hi, 5);
    value_frame(figure, &plot, &axis, spec);

    if points.is_empty() {
        return;
    }
    let first = points.iter().map(|p| p.position).fold(f64::INFINITY, f64::min);
    let last = points.iter().map(|p| p.position).fold(f64::NEG_INFINITY, f64::max);
    let span = last - first;
    let inset = 12.0;
    let x_of = |position: f64| {
        if span > 0.0 {
            plot.left + inset + (position - first) / span * (plot.width() - 2.0 * inset)
        } else {
            plot.left + plot.width() / 2.0
        }
    };

    let coords: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (x_of(p.position), axis.scale(p.value, plot.bottom, plot.top)))
        .collect();
    figure.shapes.push(Shape::Polyline {
        points: coords.clone(),
        stroke: PALETTE[0].to_string(),
        width: 2.0,
    });

    if spec.markers {
        for (point, (x, y)) in points.iter().zip(&coords) {
            figure.shapes.push(Shape::Circle {
                cx: *x,
                cy: *y,
                r: 3.5,
                fill: PALETTE[0].to_string(),
                tooltip: Some(format!("{}: {}", point.label, format_tick(point.value))),
            });
        }
    }

    // At most six evenly spaced date labels.
    let stride = points.len().div_ceil(6).max(1);
    for (point, (x, _)) in points.iter().zip(&coords).step_by(stride) {
        figure.text(*x, plot.bottom + 16.0, point.label.clone(), 11.0, Anchor::Middle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::spec::ChartKind;

    fn datum(label: &str, value: f64) -> Datum {
        Datum {
            label: label.into(),
            value,
            text: None,
        }
    }

    fn spec(kind: ChartKind, data: ChartData) -> ChartSpec {
        ChartSpec {
            kind,
            x_label: Some("x".into()),
            y_label: Some("y".into()),
            data,
            show_text: false,
            markers: false,
            hole: 0.0,
        }
    }

    #[test]
    fn nice_axis_rounds_outwards() {
        let axis = nice_axis(0.0, 9_320_000.0, 5);
        assert_eq!(axis.min, 0.0);
        assert!((axis.step - 2_000_000.0).abs() < 1e-6);
        assert!((axis.max - 10_000_000.0).abs() < 1e-3);
        assert_eq!(axis.ticks().len(), 6);
    }

    #[test]
    fn flat_series_still_gets_a_range() {
        let axis = nice_axis(21.5, 21.5, 5);
        assert!(axis.min < 21.5 && axis.max > 21.5);
        let zero = nice_axis(0.0, 0.0, 5);
        assert_eq!((zero.min, zero.max), (0.0, 1.0));
    }

    #[test]
    fn squarify_fills_bounds() {
        let bounds = Tile {
            x: 0.0,
            y: 0.0,
            width: 600.0,
            height: 400.0,
        };
        let tiles = squarify(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], bounds);
        assert_eq!(tiles.len(), 7);
        let area: f64 = tiles.iter().map(|t| t.width * t.height).sum();
        assert!((area - 240_000.0).abs() < 1e-6);
        for tile in &tiles {
            assert!(tile.x >= -1e-9 && tile.x + tile.width <= 600.0 + 1e-6);
            assert!(tile.y >= -1e-9 && tile.y + tile.height <= 400.0 + 1e-6);
        }
    }

    #[test]
    fn bar_chart_has_one_mark_per_category() {
        let figure = layout(&spec(
            ChartKind::Bar,
            ChartData::Categories(vec![datum("Jawa", 4.0), datum("Sumatera", 2.0)]),
        ));
        assert_eq!(figure.mark_count(), 2);
    }

    #[test]
    fn pie_slices_run_largest_first() {
        let figure = layout(&spec(
            ChartKind::Pie,
            ChartData::Slices(vec![datum("55+", 1.0), datum("18-24", 3.0)]),
        ));
        let first_tooltip = figure.shapes.iter().find_map(|shape| match shape {
            Shape::Path { tooltip, .. } => tooltip.clone(),
            _ => None,
        });
        assert_eq!(first_tooltip.as_deref(), Some("18-24: 3"));
        let labels: Vec<&str> = figure
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Text { content, .. } if content.ends_with('%') => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["75.0%", "25.0%"]);
    }

    #[test]
    fn single_slice_is_drawn_as_two_halves() {
        let figure = layout(&spec(
            ChartKind::Pie,
            ChartData::Slices(vec![datum("only", 5.0)]),
        ));
        assert_eq!(figure.mark_count(), 2);
    }

    #[test]
    fn line_markers_follow_points() {
        let points = (0u8..12)
            .map(|month| SeriesPoint {
                position: f64::from(month) * 30.0,
                label: format!("m{month}"),
                value: 20.0 + f64::from(month) * 0.5,
            })
            .collect();
        let mut chart = spec(ChartKind::Line, ChartData::Series(points));
        chart.markers = true;
        let figure = layout(&chart);
        assert_eq!(figure.mark_count(), 12);
        assert!(figure
            .shapes
            .iter()
            .any(|shape| matches!(shape, Shape::Polyline { points, .. } if points.len() == 12)));
    }
}
