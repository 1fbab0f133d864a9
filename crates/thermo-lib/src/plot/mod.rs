pub mod pick;
pub mod png;

pub const DEFAULT_TITLE: &str = "Data Visualization";
pub const DEFAULT_X_LABEL: &str = "Time(min)";
pub const DEFAULT_Y_LABEL: &str = "Temp(Centigrade)";
/// Legend box fill.
pub const LEGEND_FILL: Color = Color(0xA4D3EE);
pub const LINE_ALPHA: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub width: f32,
    pub color: Color,
    pub alpha: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

/// Matplotlib's default cycle, used for primary-axis data lines.
const PALETTE: [u32; 10] = [
    0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0xE377C2, 0x7F7F7F, 0xBCBD22,
    0x17BECF,
];
pub const SECONDARY_COLOR: Color = Color(0x0000FF);
pub const THRESHOLD_COLOR: Color = Color(0xFF0000);

pub fn palette_color(index: usize) -> Color {
    Color(PALETTE[index % PALETTE.len()])
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

impl LineSeries {
    pub fn translucent(name: impl Into<String>, points: Vec<[f64; 2]>, color: Color) -> Self {
        Self {
            name: name.into(),
            points,
            style: Style {
                width: 1.5,
                color,
                alpha: LINE_ALPHA,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Line(LineSeries),
}

impl Series {
    pub fn name(&self) -> &str {
        match self {
            Series::Line(line) => &line.name,
        }
    }

    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
        }
    }

    pub fn style(&self) -> &Style {
        match self {
            Series::Line(line) => &line.style,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum YAxis {
    Primary,
    Secondary,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LegendCorner {
    UpperLeft,
    UpperRight,
}

impl YAxis {
    pub fn legend_corner(self) -> LegendCorner {
        match self {
            YAxis::Primary => LegendCorner::UpperRight,
            YAxis::Secondary => LegendCorner::UpperLeft,
        }
    }
}

/// Linear map from secondary-axis values onto the primary y-range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SecondaryScale {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl SecondaryScale {
    pub fn apply(&self, y: f64) -> f64 {
        self.to.0 + (y - self.from.0) * self.ratio()
    }

    pub fn invert(&self, y: f64) -> f64 {
        self.from.0 + (y - self.to.0) / self.ratio()
    }

    fn ratio(&self) -> f64 {
        (self.to.1 - self.to.0) / (self.from.1 - self.from.0)
    }
}

/// A drawn line in primary-axis coordinates, remembering its source values.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLine<'a> {
    pub axis: YAxis,
    pub series: &'a Series,
    pub points: Vec<[f64; 2]>,
}

/// One chart region with a primary and a secondary y-axis sharing x.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
    pub secondary: Vec<Series>,
    pub x_bounds: Option<(f64, f64)>,
    /// Bumped whenever `x_bounds` is set so views can re-apply it once.
    pub bounds_revision: u64,
    pub grid: bool,
}

impl Default for Figure {
    fn default() -> Self {
        let mut fig = Self {
            title: None,
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
            secondary: Vec::new(),
            x_bounds: None,
            bounds_revision: 0,
            grid: false,
        };
        fig.set_default_labels();
        fig
    }
}

impl Figure {
    pub fn set_default_labels(&mut self) {
        self.title = Some(DEFAULT_TITLE.into());
        self.x.label = Some(DEFAULT_X_LABEL.into());
        self.y.label = Some(DEFAULT_Y_LABEL.into());
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn add_secondary_series(&mut self, series: Series) {
        self.secondary.push(series);
    }

    pub fn set_x_bounds(&mut self, min: f64, max: f64) {
        self.x_bounds = Some((min, max));
        self.bounds_revision += 1;
    }

    /// Removes every line from both axes and forgets the x-range. Labels and
    /// the grid flag are left to the caller.
    pub fn clear(&mut self) {
        self.series.clear();
        self.secondary.clear();
        self.x_bounds = None;
        self.bounds_revision += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.secondary.is_empty()
    }

    pub fn legend_entries(&self, axis: YAxis) -> Vec<(&str, Color)> {
        let list = match axis {
            YAxis::Primary => &self.series,
            YAxis::Secondary => &self.secondary,
        };
        list.iter().map(|s| (s.name(), s.style().color)).collect()
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.x_bounds.or_else(|| {
            value_range(
                self.series
                    .iter()
                    .chain(&self.secondary)
                    .flat_map(|s| s.points().iter().map(|p| p[0])),
            )
        })
    }

    pub fn y_range(&self) -> Option<(f64, f64)> {
        value_range(self.series.iter().flat_map(|s| s.points().iter().map(|p| p[1])))
    }

    pub fn secondary_y_range(&self) -> Option<(f64, f64)> {
        value_range(
            self.secondary
                .iter()
                .flat_map(|s| s.points().iter().map(|p| p[1])),
        )
    }

    /// Secondary lines are stretched over the primary y-range. Without
    /// primary lines the secondary range is used as is.
    pub fn secondary_scale(&self) -> Option<SecondaryScale> {
        let from = widen(self.secondary_y_range()?);
        let to = widen(self.y_range().unwrap_or(from));
        Some(SecondaryScale { from, to })
    }

    /// Every line in draw order, in primary-axis coordinates.
    pub fn display_lines(&self) -> Vec<DisplayLine<'_>> {
        let mut lines: Vec<DisplayLine<'_>> = self
            .series
            .iter()
            .map(|series| DisplayLine {
                axis: YAxis::Primary,
                series,
                points: series.points().to_vec(),
            })
            .collect();
        if let Some(scale) = self.secondary_scale() {
            lines.extend(self.secondary.iter().map(|series| DisplayLine {
                axis: YAxis::Secondary,
                series,
                points: series
                    .points()
                    .iter()
                    .map(|p| [p[0], scale.apply(p[1])])
                    .collect(),
            }));
        }
        lines
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Pads a zero-width range so it can be scaled.
pub fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, points: Vec<[f64; 2]>) -> Series {
        Series::Line(LineSeries::translucent(name, points, palette_color(0)))
    }

    #[test]
    fn default_figure_has_labels_and_no_lines() {
        let fig = Figure::default();
        assert_eq!(fig.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(fig.x.label.as_deref(), Some(DEFAULT_X_LABEL));
        assert_eq!(fig.y.label.as_deref(), Some(DEFAULT_Y_LABEL));
        assert!(fig.is_empty());
    }

    #[test]
    fn secondary_maps_onto_primary_range() {
        let mut fig = Figure::default();
        fig.add_series(line("temp", vec![[0.0, 30.0], [1.0, 60.0]]));
        fig.add_secondary_series(line("power", vec![[0.0, 0.0], [1.0, 3.0]]));
        let scale = fig.secondary_scale().unwrap();
        assert_eq!(scale.apply(0.0), 30.0);
        assert_eq!(scale.apply(3.0), 60.0);
        assert!((scale.invert(45.0) - 1.5).abs() < 1e-12);
        let lines = fig.display_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].points, vec![[0.0, 30.0], [1.0, 60.0]]);
        assert_eq!(lines[1].series.points()[1], [1.0, 3.0]);
    }

    #[test]
    fn secondary_alone_is_identity() {
        let mut fig = Figure::default();
        fig.add_secondary_series(line("power", vec![[0.0, 2.0], [1.0, 4.0]]));
        let scale = fig.secondary_scale().unwrap();
        assert_eq!(scale.apply(3.0), 3.0);
    }

    #[test]
    fn clear_drops_lines_and_bounds() {
        let mut fig = Figure::default();
        fig.add_series(line("temp", vec![[0.0, 1.0]]));
        fig.set_x_bounds(0.0, 4.0);
        let revision = fig.bounds_revision;
        fig.clear();
        assert!(fig.is_empty());
        assert_eq!(fig.x_bounds, None);
        assert!(fig.bounds_revision > revision);
    }

    #[test]
    fn color_channels() {
        assert_eq!(LEGEND_FILL.rgb(), (0xA4, 0xD3, 0xEE));
    }
}
