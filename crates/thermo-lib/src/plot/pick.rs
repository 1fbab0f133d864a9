use super::{Figure, YAxis};

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub series: String,
    pub axis: YAxis,
    /// Source values of the vertices under the pointer.
    pub points: Vec<[f64; 2]>,
}

impl PickHit {
    pub fn message(&self) -> String {
        let pairs: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("({}, {})", p[0], p[1]))
            .collect();
        format!("Plot coords:\n ({})", pairs.join(", "))
    }
}

/// Hit-test a click against every line of `fig`.
///
/// `pointer` is in primary-axis plot coordinates and `value_per_px` converts
/// one screen pixel into plot units along x and y, sign ignored. The topmost
/// line with a vertex within `radius_px` wins; all of its vertices in range
/// are returned.
pub fn pick(
    fig: &Figure,
    pointer: [f64; 2],
    value_per_px: [f64; 2],
    radius_px: f64,
) -> Option<PickHit> {
    let scale = |v: f64| {
        let v = v.abs();
        if v.is_finite() && v > 0.0 {
            v
        } else {
            1.0
        }
    };
    let (sx, sy) = (scale(value_per_px[0]), scale(value_per_px[1]));
    fig.display_lines().into_iter().rev().find_map(|line| {
        let source = line.series.points();
        let points: Vec<[f64; 2]> = line
            .points
            .iter()
            .zip(source)
            .filter(|(shown, _)| {
                let dx = (shown[0] - pointer[0]) / sx;
                let dy = (shown[1] - pointer[1]) / sy;
                (dx * dx + dy * dy).sqrt() <= radius_px
            })
            .map(|(_, original)| *original)
            .collect();
        if points.is_empty() {
            None
        } else {
            Some(PickHit {
                series: line.series.name().to_string(),
                axis: line.axis,
                points,
            })
        }
    })
}
