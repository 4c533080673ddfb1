use crate::app::renderer::theme::Palette;
use egui::{
    pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Response, Sense, Shape, Stroke, Ui,
};
use sysmon_core::history::History;

const MARGIN_LEFT: f32 = 44.0;
const MARGIN_RIGHT: f32 = 12.0;
const MARGIN_TOP: f32 = 24.0;
const MARGIN_BOTTOM: f32 = 20.0;
const GRID_LINES: usize = 4;
const HEADROOM: f32 = 1.2;

/// Vertical range of a chart.
#[derive(Debug, Copy, Clone, PartialEq)]
#[must_use]
pub enum Scale {
    /// Always `0..=max`.
    Fixed(f32),
    /// Grows with the data, leaving headroom above the largest value and never shrinking
    /// below `floor`.
    Auto { floor: f32 },
}

impl Scale {
    pub const PERCENT: Self = Self::Fixed(100.0);

    /// Upper bound of the y axis for the given values.
    #[must_use]
    pub fn max(self, values: impl IntoIterator<Item = f32>) -> f32 {
        match self {
            Self::Fixed(max) => max,
            Self::Auto { floor } => {
                let peak = values
                    .into_iter()
                    .filter(|value| value.is_finite())
                    .fold(0.0, f32::max);
                (peak * HEADROOM).max(floor)
            }
        }
    }
}

/// One series drawn on a [`Chart`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Line<'a> {
    pub label: &'a str,
    pub color: Color32,
    pub history: &'a History<f32>,
    /// Converts stored values into chart units.
    pub map: fn(f32) -> f32,
}

impl<'a> Line<'a> {
    pub fn new(label: &'a str, color: Color32, history: &'a History<f32>) -> Self {
        Self {
            label,
            color,
            history,
            map: std::convert::identity,
        }
    }

    pub fn with_map(mut self, map: fn(f32) -> f32) -> Self {
        self.map = map;
        self
    }

    fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().map(|&value| (self.map)(value))
    }
}

/// A time-series line chart with the newest value at `x = 0` and older values to the left.
#[derive(Debug, Clone)]
#[must_use]
pub struct Chart<'a> {
    title: &'a str,
    unit: &'a str,
    scale: Scale,
    lines: Vec<Line<'a>>,
    threshold: Option<f32>,
    height: f32,
}

impl<'a> Chart<'a> {
    pub fn new(title: &'a str, unit: &'a str, scale: Scale) -> Self {
        Self {
            title,
            unit,
            scale,
            lines: Vec::new(),
            threshold: None,
            height: 160.0,
        }
    }

    pub fn line(mut self, line: Line<'a>) -> Self {
        self.lines.push(line);
        self
    }

    /// Draws a dashed alert limit across the chart.
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub const fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn show(self, ui: &mut Ui, palette: &Palette) -> Response {
        let size = vec2(ui.available_width(), self.height);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 6.0, palette.chart_bg);

        let plot = Rect::from_min_max(
            pos2(rect.left() + MARGIN_LEFT, rect.top() + MARGIN_TOP),
            pos2(rect.right() - MARGIN_RIGHT, rect.bottom() - MARGIN_BOTTOM),
        );
        if plot.width() <= 0.0 || plot.height() <= 0.0 {
            return response;
        }

        let capacity = self
            .lines
            .first()
            .map_or(1, |line| line.history.capacity());
        let y_max = self.scale.max(self.lines.iter().flat_map(|line| line.values()));

        self.grid(&painter, plot, y_max, capacity, palette);
        if let Some(threshold) = self.threshold.filter(|&value| value <= y_max) {
            let y = y_position(threshold, y_max, plot);
            painter.extend(Shape::dashed_line(
                &[pos2(plot.left(), y), pos2(plot.right(), y)],
                Stroke::new(1.0, palette.alert),
                6.0,
                4.0,
            ));
        }
        for line in &self.lines {
            let points = points(line.values(), line.history.len(), capacity, y_max, plot);
            match points.len() {
                0 => (),
                1 => {
                    painter.circle_filled(points[0], 2.5, line.color);
                }
                _ => {
                    painter.add(Shape::line(points, Stroke::new(2.0, line.color)));
                }
            }
        }
        self.legend(&painter, rect, palette);

        response
    }

    fn grid(&self, painter: &Painter, plot: Rect, y_max: f32, capacity: usize, palette: &Palette) {
        let stroke = Stroke::new(1.0, palette.grid);
        let font = FontId::proportional(11.0);
        for step in 0..=GRID_LINES {
            let value = y_max * step as f32 / GRID_LINES as f32;
            let y = y_position(value, y_max, plot);
            painter.line_segment([pos2(plot.left(), y), pos2(plot.right(), y)], stroke);
            painter.text(
                pos2(plot.left() - 6.0, y),
                Align2::RIGHT_CENTER,
                axis_label(value),
                font.clone(),
                palette.muted,
            );
        }
        for (offset, x) in x_ticks(capacity, plot) {
            painter.line_segment([pos2(x, plot.top()), pos2(x, plot.bottom())], stroke);
            painter.text(
                pos2(x, plot.bottom() + 3.0),
                Align2::CENTER_TOP,
                format!("{offset}s"),
                font.clone(),
                palette.muted,
            );
        }
    }

    fn legend(&self, painter: &Painter, rect: Rect, palette: &Palette) {
        let font = FontId::proportional(13.0);
        let title = if self.unit.is_empty() {
            self.title.to_string()
        } else {
            format!("{} ({})", self.title, self.unit)
        };
        painter.text(
            pos2(rect.left() + 8.0, rect.top() + 4.0),
            Align2::LEFT_TOP,
            title,
            font.clone(),
            palette.text,
        );

        let mut x = rect.right() - MARGIN_RIGHT;
        for line in self.lines.iter().rev() {
            let text = line.values().last().map_or_else(
                || format!("{}: N/A", line.label),
                |value| format!("{}: {value:.1}", line.label),
            );
            let galley = painter.layout_no_wrap(text, font.clone(), palette.text);
            let width = galley.size().x;
            painter.galley(pos2(x - width, rect.top() + 4.0), galley, palette.text);
            x -= width + 14.0;
            painter.rect_filled(
                Rect::from_center_size(pos2(x + 6.0, rect.top() + 12.0), vec2(8.0, 8.0)),
                1.0,
                line.color,
            );
            x -= 8.0;
        }
    }
}

fn y_position(value: f32, y_max: f32, plot: Rect) -> f32 {
    let ratio = if y_max > 0.0 {
        (value / y_max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    plot.bottom() - ratio * plot.height()
}

/// Maps the oldest..newest values onto the plot, with the newest on the right edge.
fn points(
    values: impl Iterator<Item = f32>,
    len: usize,
    capacity: usize,
    y_max: f32,
    plot: Rect,
) -> Vec<Pos2> {
    let span = capacity.saturating_sub(1).max(1) as f32;
    values
        .enumerate()
        .filter(|(_, value)| value.is_finite())
        .map(|(index, value)| {
            let age = (len - 1 - index) as f32;
            let x = plot.right() - age / span * plot.width();
            pos2(x, y_position(value, y_max, plot))
        })
        .collect()
}

/// Seconds-ago labels from `-(capacity - 1)` to `0`.
fn x_ticks(capacity: usize, plot: Rect) -> impl Iterator<Item = (i64, f32)> {
    let span = capacity.saturating_sub(1).max(1);
    let steps = GRID_LINES.min(span);
    (0..=steps).map(move |step| {
        let age = span * (steps - step) / steps;
        let x = plot.right() - age as f32 / span as f32 * plot.width();
        (-(age as i64), x)
    })
}

fn axis_label(value: f32) -> String {
    if value >= 10.0 || value == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
