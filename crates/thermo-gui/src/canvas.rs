use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use egui_plot::{AxisHints, HPlacement, Line, Plot, PlotBounds};
use thermo_lib::plot::pick::{pick, PickHit};
use thermo_lib::plot::{Color, Figure, LegendCorner, Style, YAxis, LEGEND_FILL};

const LEGEND_FONT_SIZE: f32 = 12.0;
const LEGEND_SWATCH: f32 = 20.0;
const LEGEND_PAD: f32 = 6.0;

/// Draws a [`Figure`] with egui_plot and hit-tests clicks on it.
pub struct CanvasView {
    applied_revision: u64,
    pick_radius_px: f64,
}

impl CanvasView {
    pub fn new(pick_radius_px: f64) -> Self {
        Self {
            applied_revision: 0,
            pick_radius_px,
        }
    }

    /// Returns the vertices under the pointer when the user clicked a line.
    pub fn show(&mut self, ui: &mut egui::Ui, fig: &Figure) -> Option<PickHit> {
        let mut y_axes = vec![AxisHints::new_y().label(fig.y.label.clone().unwrap_or_default())];
        if let Some(scale) = fig.secondary_scale() {
            y_axes.push(
                AxisHints::new_y()
                    .placement(HPlacement::Right)
                    .formatter(move |mark, _range| format_tick(scale.invert(mark.value))),
            );
        }

        let reapply = fig.bounds_revision != self.applied_revision;
        self.applied_revision = fig.bounds_revision;

        if let Some(title) = &fig.title {
            ui.vertical_centered(|ui| {
                ui.heading(title.as_str());
            });
        }
        let response = Plot::new("thermal_plot")
            .x_axis_label(fig.x.label.clone().unwrap_or_default())
            .custom_y_axes(y_axes)
            .show_grid(fig.grid)
            .show(ui, |plot_ui| {
                for line in fig.display_lines() {
                    let style = line.series.style();
                    plot_ui.line(
                        Line::new(line.points)
                            .color(color32(style))
                            .width(style.width),
                    );
                }
                if reapply {
                    match fig.x_bounds {
                        Some((xmin, xmax)) => {
                            let current = plot_ui.plot_bounds();
                            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                                [xmin, current.min()[1]],
                                [xmax, current.max()[1]],
                            ));
                            plot_ui.set_auto_bounds(egui::Vec2b::new(false, true));
                        }
                        None => plot_ui.set_auto_bounds(egui::Vec2b::new(true, true)),
                    }
                }
                plot_ui.pointer_coordinate()
            });

        let frame = *response.transform.frame();
        paint_legend(ui, frame, &fig.legend_entries(YAxis::Primary), YAxis::Primary.legend_corner());
        paint_legend(
            ui,
            frame,
            &fig.legend_entries(YAxis::Secondary),
            YAxis::Secondary.legend_corner(),
        );

        if !response.response.clicked() {
            return None;
        }
        let pointer = response.inner?;
        pick(
            fig,
            [pointer.x, pointer.y],
            response.transform.dvalue_dpos(),
            self.pick_radius_px,
        )
    }
}

fn paint_legend(ui: &egui::Ui, frame: Rect, entries: &[(&str, Color)], corner: LegendCorner) {
    if entries.is_empty() {
        return;
    }
    let painter = ui.painter_at(frame);
    let font = FontId::proportional(LEGEND_FONT_SIZE);
    let galleys: Vec<_> = entries
        .iter()
        .map(|(name, _)| painter.layout_no_wrap(name.to_string(), font.clone(), Color32::BLACK))
        .collect();
    let text_width = galleys.iter().map(|g| g.size().x).fold(0.0, f32::max);
    let row_height = galleys
        .iter()
        .map(|g| g.size().y)
        .fold(LEGEND_FONT_SIZE, f32::max);
    let size = Vec2::new(
        LEGEND_SWATCH + text_width + 3.0 * LEGEND_PAD,
        row_height * entries.len() as f32 + 2.0 * LEGEND_PAD,
    );
    let rect = legend_rect(frame, size, corner);

    let (r, g, b) = LEGEND_FILL.rgb();
    painter.rect_filled(rect.translate(Vec2::splat(2.0)), 2.0, Color32::from_black_alpha(60));
    painter.rect(rect, 2.0, Color32::from_rgb(r, g, b), Stroke::new(1.0, Color32::DARK_GRAY));
    for (i, ((_, color), galley)) in entries.iter().zip(galleys).enumerate() {
        let y = rect.top() + LEGEND_PAD + row_height * (i as f32 + 0.5);
        let x = rect.left() + LEGEND_PAD;
        let (r, g, b) = color.rgb();
        painter.line_segment(
            [Pos2::new(x, y), Pos2::new(x + LEGEND_SWATCH, y)],
            Stroke::new(2.0, Color32::from_rgb(r, g, b)),
        );
        let anchor = Align2::LEFT_CENTER.anchor_size(
            Pos2::new(x + LEGEND_SWATCH + LEGEND_PAD, y),
            galley.size(),
        );
        painter.galley(anchor.min, galley, Color32::BLACK);
    }
}

fn legend_rect(frame: Rect, size: Vec2, corner: LegendCorner) -> Rect {
    let margin = 8.0;
    let min = match corner {
        LegendCorner::UpperLeft => Pos2::new(frame.left() + margin, frame.top() + margin),
        LegendCorner::UpperRight => {
            Pos2::new(frame.right() - margin - size.x, frame.top() + margin)
        }
    };
    Rect::from_min_size(min, size)
}

fn color32(style: &Style) -> Color32 {
    let (r, g, b) = style.color.rgb();
    let alpha = (style.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".into()
    } else {
        rounded.to_string()
    }
}
