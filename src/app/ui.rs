use super::{RunPhase, StatusMonitor};
use crate::config::Variant;
use crate::status::{Details, Table, Tone};
use eframe::egui::{self, Align, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const DANGER: Color32 = Color32::from_rgb(220, 50, 50);

impl StatusMonitor {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading(self.config.variant.title());
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Live status of the submitted job")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_connection(ui, ctx);

                    ui.add_space(20.0);
                    self.render_progress(ui);

                    if self.state.details.is_some() {
                        ui.add_space(10.0);
                        self.render_details(ui);
                    }

                    if self.config.variant == Variant::Task {
                        ui.add_space(10.0);
                        self.render_continue(ui, ctx);
                    }

                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });
    }

    fn render_connection(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Status URL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.url_text)
                        .desired_width(ui.available_width()),
                );
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Paste the status request as cURL (optional)");
                ui.add_space(4.0);
                ui.label("ℹ").on_hover_text_at_pointer(
                    "To reuse your session:\n\
                    1. Open Developer Tools (F12)\n\
                    2. Go to Network tab\n\
                    3. Find the check-status request\n\
                    4. Right-click and Copy as cURL",
                );
            });
            ui.add_sized(
                [ui.available_width(), 80.0],
                egui::TextEdit::multiline(&mut self.curl_text)
                    .font(egui::TextStyle::Monospace)
                    .hint_text("curl 'http://127.0.0.1:8000/check-status/' -H 'Cookie: ...'"),
            );

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let polling = self.state.is_polling();
                if ui
                    .add_enabled(!self.curl_text.is_empty(), egui::Button::new("📋 Use cURL"))
                    .clicked()
                {
                    self.import_curl();
                }
                if ui
                    .add_enabled(
                        !polling && !self.url_text.trim().is_empty(),
                        egui::Button::new("▶ Start"),
                    )
                    .clicked()
                {
                    self.start_polling(Some(ctx.clone()));
                }
                if ui.add_enabled(polling, egui::Button::new("⏹ Stop")).clicked() {
                    self.stop_polling();
                }
            });
        });
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        if matches!(self.state.phase, RunPhase::Idle) {
            return;
        }

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Current state:");
                match self.state.state_label {
                    Some(label) => {
                        let color = if label.is_success() { SUCCESS } else { DANGER };
                        ui.label(RichText::new(label.text()).strong().color(color));
                    }
                    None => {
                        ui.label(RichText::new("PENDING").strong());
                    }
                }
            });

            let progress_bar = egui::ProgressBar::new(self.state.progress_fraction())
                .show_percentage()
                .animate(self.state.progress_active && self.state.is_polling())
                .fill(ACCENT);
            ui.add(progress_bar);

            if !self.state.progress_message.is_empty() {
                ui.label(self.state.progress_message.as_str());
            }
            ui.label(self.state.get_status_text());
        });
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        if ui
            .button(if self.state.show_markup {
                "Show Table"
            } else {
                "Show HTML"
            })
            .clicked()
        {
            self.state.show_markup = !self.state.show_markup;
        }

        let Some(details) = &self.state.details else {
            return;
        };
        let tone = self.state.response_tone;

        egui::ScrollArea::both()
            .max_height(300.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        if self.state.show_markup {
                            ui.monospace(details.to_markup());
                            return;
                        }
                        match details {
                            Details::Table(table) => render_table(ui, table, tone),
                            Details::Error(detail) => {
                                ui.colored_label(DANGER, detail.as_str());
                            }
                        }
                    });
            });
    }

    fn render_continue(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Stored file:");
                ui.monospace(self.state.reference.as_deref().unwrap_or("-"));
            });
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                let button = egui::Button::new("Continue ➡").min_size(egui::vec2(200.0, 40.0));
                if ui.add_enabled(self.state.continue_enabled, button).clicked() {
                    self.continue_with_reference(ctx);
                }
            });
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!(
                    "{} · {} request headers",
                    self.config.variant.status_path(),
                    self.config.headers.len()
                ))
                .small()
                .color(ui.visuals().text_color().gamma_multiply(0.5)),
            );
        });

        if let Some(error) = &self.error_message {
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(DANGER, error.as_str());
            });
        }
    }
}

fn render_table(ui: &mut egui::Ui, table: &Table, tone: Tone) {
    let text_color = match tone {
        Tone::Success => SUCCESS,
        Tone::Neutral => ui.visuals().text_color(),
    };

    egui::Grid::new("result_table")
        .striped(true)
        .min_col_width(60.0)
        .show(ui, |ui| {
            for header in &table.headers {
                ui.label(RichText::new(header).strong());
            }
            ui.end_row();

            for row in &table.rows {
                for cell in row {
                    ui.colored_label(text_color, cell.as_str());
                }
                ui.end_row();
            }
        });

    ui.label(format!("{} rows", table.rows.len()));
}
