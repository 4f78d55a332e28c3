use eframe::egui;
use geocolumn_core::{CsvTable, GeocodeContext, GeocodeJob, ProgressEvent};

pub struct GeocolumnApp {
    context: GeocodeContext,

    // Loaded input
    table: Option<CsvTable>,
    selected_column: Option<String>,

    // Running job, if any
    job: Option<GeocodeJob>,

    // UI state
    log_lines: Vec<String>,
    dialog: Option<Dialog>,
}

/// Modal message shown on top of the main panel
struct Dialog {
    title: String,
    message: String,
    is_error: bool,
}

impl GeocolumnApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, context: GeocodeContext) -> Self {
        Self {
            context,
            table: None,
            selected_column: None,
            job: None,
            log_lines: Vec::new(),
            dialog: None,
        }
    }

    fn is_processing(&self) -> bool {
        self.job.is_some()
    }

    fn show_error(&mut self, title: &str, message: String) {
        log::error!("{}: {}", title, message);
        self.dialog = Some(Dialog {
            title: title.to_string(),
            message,
            is_error: true,
        });
    }

    fn show_warning(&mut self, message: String) {
        log::warn!("{}", message);
        self.dialog = Some(Dialog {
            title: "Warning".to_string(),
            message,
            is_error: false,
        });
    }

    fn open_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select CSV file")
            .add_filter("CSV file", &["csv"])
            .pick_file()
        else {
            return;
        };

        match CsvTable::load(&path) {
            Ok(table) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.log_lines.clear();
                self.log_lines
                    .push(format!("Loaded '{}'. Select a column.", name));
                self.selected_column = None;
                self.table = Some(table);
            }
            Err(e) => self.show_error("CSV error", e.to_string()),
        }
    }

    fn start_processing(&mut self) {
        match GeocodeJob::start(
            &self.context,
            self.table.as_ref(),
            self.selected_column.as_deref(),
        ) {
            Ok(job) => {
                self.log_lines.clear();
                self.job = Some(job);
            }
            Err(e) => self.show_warning(e.to_string()),
        }
    }

    /// Drain worker events without blocking the UI thread
    fn poll_job(&mut self) {
        let Some(job) = &self.job else {
            return;
        };

        let worker_done = job.is_finished();
        let events = job.poll();
        for event in events {
            self.handle_event(event);
        }

        if worker_done {
            if let Some(job) = self.job.take() {
                // Anything sent between the two polls is still in the channel
                for event in job.poll() {
                    self.handle_event(event);
                }
                job.join();
            }
        }
    }

    fn handle_event(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                self.log_lines
                    .push(format!("Processing {} values...", total));
            }
            ProgressEvent::Row(progress) => {
                self.log_lines.push(progress.line());
            }
            ProgressEvent::Finished {
                output_path,
                failed,
                not_found,
                ..
            } => {
                self.log_lines.push(String::new());
                self.log_lines.push("Processing complete!".to_string());
                if failed > 0 || not_found > 0 {
                    self.log_lines.push(format!(
                        "{} failed, {} without result",
                        failed, not_found
                    ));
                }
                let name = output_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.log_lines
                    .push(format!("Results saved as '{}'.", name));
            }
            ProgressEvent::WriteFailed { message } => {
                self.log_lines.push(String::new());
                self.log_lines.push("Processing complete!".to_string());
                self.show_error("Save error", message);
            }
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.is_processing(), egui::Button::new("📂 Open CSV"))
                .clicked()
            {
                self.open_csv();
            }

            ui.separator();

            let can_start = self.table.is_some() && !self.is_processing();
            if ui
                .add_enabled(can_start, egui::Button::new("▶ Start geocoding"))
                .on_hover_text("Resolve every non-empty value of the selected column")
                .clicked()
            {
                self.start_processing();
            }

            if self.is_processing() {
                ui.spinner();
            }
        });
    }

    fn render_columns(&mut self, ui: &mut egui::Ui) {
        let Some(table) = &self.table else {
            return;
        };

        ui.strong("Columns");
        egui::ScrollArea::vertical()
            .id_salt("columns")
            .max_height(140.0)
            .show(ui, |ui| {
                for header in table.headers() {
                    let selected = self.selected_column.as_deref() == Some(header.as_str());
                    if ui.selectable_label(selected, header.as_str()).clicked() && self.job.is_none() {
                        self.selected_column = Some(header.clone());
                    }
                }
            });
    }

    fn render_log(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("log")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &self.log_lines {
                    ui.label(line.as_str());
                }
            });
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else {
            return;
        };

        let mut close = false;
        egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let color = if dialog.is_error {
                    egui::Color32::RED
                } else {
                    egui::Color32::YELLOW
                };
                ui.colored_label(color, dialog.message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    close = true;
                }
            });

        if close {
            self.dialog = None;
        }
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            if let Some(table) = &self.table {
                ui.label(format!("📄 {}", table.path().display()));
                ui.separator();
                ui.label(format!("Rows: {}", table.row_count()));
                ui.separator();
            }
            if let Some(column) = &self.selected_column {
                ui.label(format!("Column: {}", column));
            }
        });
    }
}

impl eframe::App for GeocolumnApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background progress
        if self.is_processing() {
            self.poll_job();
            ctx.request_repaint(); // Keep refreshing while processing
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("geocolumn - Geocoding / Reverse Geocoding");
            ui.add_space(10.0);

            self.render_controls(ui);
            ui.add_space(10.0);

            if self.table.is_some() {
                self.render_columns(ui);
                ui.add_space(10.0);
            } else if !self.is_processing() {
                ui.label("Open a CSV file to begin");
            }

            ui.separator();
            self.render_log(ui);
        });

        self.render_dialog(ctx);
    }
}
