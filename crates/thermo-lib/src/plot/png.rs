use super::{widen, Color, Figure, LegendCorner, Series, Style, YAxis, LEGEND_FILL};
use anyhow::{bail, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

const LEGEND_FONT_PX: u32 = 18;
const LEGEND_SWATCH: u32 = 30;
const LEGEND_PAD: u32 = 8;
const LEGEND_MARGIN: u32 = 10;

/// Appends `.png` when the chosen path has no extension.
pub fn with_png_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("png")
    }
}

/// Axis ranges for the saved image: (x, primary y, secondary y).
pub fn chart_ranges(fig: &Figure) -> ((f64, f64), (f64, f64), (f64, f64)) {
    let x = ordered(widen(fig.x_range().unwrap_or((0.0, 1.0))));
    let y = widen(
        fig.y_range()
            .or_else(|| fig.secondary_y_range())
            .unwrap_or((0.0, 1.0)),
    );
    let y2 = widen(fig.secondary_y_range().unwrap_or(y));
    (x, y, y2)
}

pub fn save_png(path: &Path, fig: &Figure, size: (u32, u32)) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            bail!("directory {} does not exist", dir.display());
        }
    }
    draw_chart(path, fig, size).with_context(|| format!("failed to save plot to {}", path.display()))?;
    log::info!("saved plot to {}", path.display());
    Ok(())
}

fn draw_chart(path: &Path, fig: &Figure, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let (x, y, y2) = chart_ranges(fig);
    let has_secondary = !fig.secondary.is_empty();

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70);
    if has_secondary {
        builder.right_y_label_area_size(70);
    }
    if let Some(title) = &fig.title {
        builder.caption(title.as_str(), ("sans-serif", 32));
    }
    let mut chart = builder
        .build_cartesian_2d(x.0..x.1, y.0..y.1)?
        .set_secondary_coord(x.0..x.1, y2.0..y2.1);

    let mut mesh = chart.configure_mesh();
    if !fig.grid {
        mesh.disable_mesh();
    }
    if let Some(label) = &fig.x.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &fig.y.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()?;

    if has_secondary {
        chart.configure_secondary_axes().draw()?;
    }

    for series in &fig.series {
        let Series::Line(line) = series;
        chart.draw_series(LineSeries::new(
            line.points.iter().map(|p| (p[0], p[1])),
            shape_style(&line.style),
        ))?;
    }
    for series in &fig.secondary {
        let Series::Line(line) = series;
        chart.draw_secondary_series(LineSeries::new(
            line.points.iter().map(|p| (p[0], p[1])),
            shape_style(&line.style),
        ))?;
    }

    let area = chart.plotting_area().strip_coord_spec();
    for axis in [YAxis::Primary, YAxis::Secondary] {
        draw_legend(&area, &fig.legend_entries(axis), axis.legend_corner())?;
    }
    root.present()?;
    Ok(())
}

/// One boxed legend per axis, pinned to `corner` of the plotting area.
fn draw_legend(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    entries: &[(&str, Color)],
    corner: LegendCorner,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let font = TextStyle::from(("sans-serif", LEGEND_FONT_PX).into_font()).color(&BLACK);
    let mut text_width = 0;
    for (name, _) in entries {
        let (w, _) = area.estimate_text_size(name, &font)?;
        text_width = text_width.max(w);
    }
    let row = LEGEND_FONT_PX + LEGEND_PAD / 2;
    let size = (
        LEGEND_SWATCH + text_width + 3 * LEGEND_PAD,
        row * entries.len() as u32 + 2 * LEGEND_PAD,
    );
    let (x0, y0) = legend_origin(area.dim_in_pixel(), size, corner);
    let corners = [(x0, y0), (x0 + size.0 as i32, y0 + size.1 as i32)];

    let (r, g, b) = LEGEND_FILL.rgb();
    area.draw(&Rectangle::new(corners, RGBColor(r, g, b).filled()))?;
    area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;
    let font = font.pos(Pos::new(HPos::Left, VPos::Center));
    for (i, (name, color)) in entries.iter().enumerate() {
        let y = y0 + (LEGEND_PAD + row * i as u32 + row / 2) as i32;
        let x = x0 + LEGEND_PAD as i32;
        let (r, g, b) = color.rgb();
        area.draw(&PathElement::new(
            vec![(x, y), (x + LEGEND_SWATCH as i32, y)],
            RGBColor(r, g, b).stroke_width(2),
        ))?;
        area.draw(&Text::new(
            name.to_string(),
            (x + (LEGEND_SWATCH + LEGEND_PAD) as i32, y),
            font.clone(),
        ))?;
    }
    Ok(())
}

/// Top-left pixel of a legend box of `size` inside an area of `area` pixels.
fn legend_origin(area: (u32, u32), size: (u32, u32), corner: LegendCorner) -> (i32, i32) {
    let top = LEGEND_MARGIN as i32;
    match corner {
        LegendCorner::UpperLeft => (LEGEND_MARGIN as i32, top),
        LegendCorner::UpperRight => (area.0 as i32 - (LEGEND_MARGIN + size.0) as i32, top),
    }
}

fn shape_style(style: &Style) -> ShapeStyle {
    let (r, g, b) = style.color.rgb();
    RGBColor(r, g, b)
        .mix(style.alpha as f64)
        .stroke_width(style.width.round().max(1.0) as u32)
}

fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
