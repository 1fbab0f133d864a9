use eframe::{egui, egui::ViewportBuilder};
use std::collections::VecDeque;
use std::path::Path;
use thermo_lib::bound::{BoundControl, BoundMode};
use thermo_lib::command::{Command, Notice, NoticeLevel};
use thermo_lib::config::{AppConfig, CONFIG_FILE_NAME};
use thermo_lib::router::{Outcome, Router};

mod canvas;
mod dialogs;

use canvas::CanvasView;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME));
    let title = config.window_title.clone();
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([1200.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(ThermoApp::new(config)))),
    )
}

/// Actions that need a native dialog before they become a [`Command`].
enum Request {
    Import,
    SavePlot,
    Export,
    Run(Command),
}

struct ThermoApp {
    router: Router,
    canvas: CanvasView,
    notices: VecDeque<Notice>,
}

impl ThermoApp {
    fn new(config: AppConfig) -> Self {
        let canvas = CanvasView::new(config.pick_radius_px);
        Self {
            router: Router::new(config),
            canvas,
            notices: VecDeque::new(),
        }
    }

    fn handle(&mut self, ctx: &egui::Context, request: Request) {
        let command = match request {
            Request::Import => dialogs::pick_workbook().map(Command::Import),
            Request::SavePlot => dialogs::pick_plot_destination().map(Command::SavePlot),
            Request::Export => dialogs::pick_report_images().map(Command::Export),
            Request::Run(command) => Some(command),
        };
        let Some(command) = command else {
            log::debug!("dialog cancelled");
            return;
        };
        for outcome in self.router.submit(command) {
            match outcome {
                Outcome::Notice(notice) => self.notices.push_back(notice),
                Outcome::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            }
        }
    }

    fn shortcuts(&self, ctx: &egui::Context, requests: &mut Vec<Request>) {
        use egui::{Key, KeyboardShortcut, Modifiers};
        let shortcut = |key| KeyboardShortcut::new(Modifiers::COMMAND, key);
        let editing = ctx.wants_keyboard_input();
        ctx.input_mut(|i| {
            if i.consume_shortcut(&shortcut(Key::I)) {
                requests.push(Request::Import);
            }
            if i.consume_shortcut(&shortcut(Key::S)) {
                requests.push(Request::SavePlot);
            }
            if i.consume_shortcut(&shortcut(Key::E)) {
                requests.push(Request::Export);
            }
            if exit_shortcut_active(editing) && i.consume_shortcut(&shortcut(Key::X)) {
                requests.push(Request::Run(Command::Exit));
            }
            if i.consume_key(Modifiers::NONE, Key::F1) {
                requests.push(Request::Run(Command::About));
            }
        });
    }

    fn show_menu(&self, ui: &mut egui::Ui, requests: &mut Vec<Request>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                menu_item(ui, "Import", "Ctrl+I", requests, || Request::Import);
                menu_item(ui, "Save plot", "Ctrl+S", requests, || Request::SavePlot);
                menu_item(ui, "Export Excel", "Ctrl+E", requests, || Request::Export);
                ui.separator();
                menu_item(ui, "Exit", "Ctrl+X", requests, || {
                    Request::Run(Command::Exit)
                });
            });
            ui.menu_button("Help", |ui| {
                menu_item(ui, "About", "F1", requests, || Request::Run(Command::About));
            });
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, requests: &mut Vec<Request>) {
        let state = self.router.state_mut();
        ui.horizontal(|ui| {
            ui.label("Sheet");
            ui.add_space(60.0);
            if ui.button("Column").clicked() {
                requests.push(Request::Run(Command::LoadColumns));
            }
            ui.add_space(60.0);
            if ui.button("Draw").clicked() {
                requests.push(Request::Run(Command::Draw));
            }
            if ui.button("Draw (Right Y Scale)").clicked() {
                requests.push(Request::Run(Command::DrawSecondary));
            }
            if ui.button("Tprochot").clicked() {
                requests.push(Request::Run(Command::DrawThreshold));
            }
            let field = ui.add(
                egui::TextEdit::singleline(&mut state.threshold_text).desired_width(60.0),
            );
            if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                requests.push(Request::Run(Command::DrawThreshold));
            }
            if ui.button("Clear").clicked() {
                requests.push(Request::Run(Command::Clear));
            }
        });

        ui.horizontal(|ui| {
            selection_list(
                ui,
                "sheets",
                state.sheet_names(),
                state.selected_sheet,
                120.0,
                |i| requests.push(Request::Run(Command::SelectSheet(i))),
            );
            selection_list(
                ui,
                "columns",
                &state.columns,
                state.selected_column,
                160.0,
                |i| requests.push(Request::Run(Command::SelectColumn(i))),
            );
            let mut grid = state.grid;
            if ui.checkbox(&mut grid, "Show Grid").changed() {
                requests.push(Request::Run(Command::SetGrid(grid)));
            }
            bound_control(ui, &mut state.x_min);
            bound_control(ui, &mut state.x_max);
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!("Status: {}", state.status));
            if let Some(sheet) = state.selected_sheet_name() {
                ui.separator();
                ui.label(format!("Sheet: {sheet}"));
            }
            ui.separator();
            ui.label(format!("Time points: {}", state.plot.time.len()));
        });
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.front() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(notice.title.clone())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                match notice.level {
                    NoticeLevel::Info => ui.label(notice.message.as_str()),
                    NoticeLevel::Error => {
                        ui.colored_label(egui::Color32::LIGHT_RED, notice.message.as_str())
                    }
                };
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.notices.pop_front();
        }
    }
}

impl eframe::App for ThermoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut requests = Vec::new();
        self.shortcuts(ctx, &mut requests);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.show_menu(ui, &mut requests);
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            self.show_controls(ui, &mut requests);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let fig = &self.router.state().figure;
            if let Some(hit) = self.canvas.show(ui, fig) {
                requests.push(Request::Run(Command::Inspect(hit)));
            }
        });

        self.show_notice(ctx);

        for request in requests {
            self.handle(ctx, request);
        }
    }
}

/// Ctrl-X stays "cut" while a text field has focus.
fn exit_shortcut_active(editing_text: bool) -> bool {
    !editing_text
}

fn menu_item(
    ui: &mut egui::Ui,
    label: &str,
    keys: &str,
    requests: &mut Vec<Request>,
    make: impl FnOnce() -> Request,
) {
    if ui
        .add(egui::Button::new(label).shortcut_text(keys))
        .clicked()
    {
        requests.push(make());
        ui.close_menu();
    }
}

fn selection_list(
    ui: &mut egui::Ui,
    id: &str,
    items: &[String],
    selected: Option<usize>,
    width: f32,
    mut on_select: impl FnMut(usize),
) {
    ui.group(|ui| {
        ui.set_width(width);
        egui::ScrollArea::vertical()
            .id_salt(id)
            .max_height(120.0)
            .show(ui, |ui| {
                for (i, item) in items.iter().enumerate() {
                    if ui.selectable_label(selected == Some(i), item).clicked() {
                        on_select(i);
                    }
                }
            });
    });
}

fn bound_control(ui: &mut egui::Ui, bound: &mut BoundControl) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.label(bound.label.as_str());
            ui.radio_value(&mut bound.mode, BoundMode::Auto, "Auto");
            ui.horizontal(|ui| {
                ui.radio_value(&mut bound.mode, BoundMode::Manual, "Manual");
                let enabled = bound.text_enabled();
                ui.add_enabled(
                    enabled,
                    egui::TextEdit::singleline(&mut bound.manual_text).desired_width(40.0),
                );
            });
        });
    });
}
