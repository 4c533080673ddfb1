use crate::app::{
    config::Config,
    event::{AppEvent, UiEvent},
    renderer::{
        chart::{Chart, Line, Scale},
        theme::{Palette, Theme},
    },
};
use chrono::{DateTime, Local};
use egui::{
    Align, CentralPanel, Color32, Context, CornerRadius, Frame, Grid, Key, Layout, Margin,
    Modifiers, RichText, ScrollArea, SidePanel, Stroke, TextEdit, TopBottomPanel, Ui, Window,
};
use egui_extras::{Column, TableBuilder};
use std::time::Duration;
use sysmon_core::{
    alert::{Alerts, Metric},
    config::MonitorConfig,
    format,
    history::{Histories, Series},
    process::ProcessInfo,
    sample::Sample,
};
use tracing::{error, trace};
use winit::event_loop::EventLoopProxy;

const CHART_HEIGHT: f32 = 170.0;

/// Editable copy of the settings shown in the settings window.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SettingsForm {
    pub interval_ms: String,
    pub history_size: String,
    pub thresholds: [String; Metric::ALL.len()],
    pub errors: Vec<String>,
}

impl SettingsForm {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            interval_ms: config.update_interval.as_millis().to_string(),
            history_size: config.history_size.to_string(),
            thresholds: Metric::ALL.map(|metric| format!("{}", config.thresholds.get(metric))),
            errors: Vec::new(),
        }
    }

    /// Applies every valid entry onto a copy of `config`. Invalid entries are collected into
    /// `errors` and leave their setting unchanged.
    pub fn apply(&mut self, config: &MonitorConfig) -> MonitorConfig {
        let mut config = config.clone();
        self.errors.clear();

        match self.interval_ms.trim().parse::<u64>() {
            Ok(ms) => {
                if let Err(err) = config.set_update_interval(Duration::from_millis(ms)) {
                    self.errors.push(err.to_string());
                }
            }
            Err(_) => self.errors.push(format!(
                "Update interval must be a whole number of milliseconds: {:?}",
                self.interval_ms
            )),
        }
        match self.history_size.trim().parse::<usize>() {
            Ok(size) => {
                if let Err(err) = config.set_history_size(size) {
                    self.errors.push(err.to_string());
                }
            }
            Err(_) => self.errors.push(format!(
                "History size must be a whole number: {:?}",
                self.history_size
            )),
        }
        for (metric, value) in Metric::ALL.into_iter().zip(&self.thresholds) {
            match value.trim().parse::<f32>() {
                Ok(value) => {
                    if let Err(err) = config.thresholds.set(metric, value) {
                        self.errors.push(err.to_string());
                    }
                }
                Err(_) => self
                    .errors
                    .push(format!("{metric} threshold must be a number: {value:?}")),
            }
        }

        config
    }
}

/// `"Monitoring | Last update: HH:MM:SS"`, or `"Never"` before the first sample.
#[must_use]
pub fn status_text(last_update: Option<DateTime<Local>>) -> String {
    let last = last_update.map_or_else(
        || "Never".to_string(),
        |time| time.format("%H:%M:%S").to_string(),
    );
    format!("Monitoring | Last update: {last}")
}

#[derive(Debug)]
#[must_use]
pub struct Gui {
    event_proxy: EventLoopProxy<AppEvent>,
    pub theme: Theme,
    applied_theme: Option<Theme>,
    pub histories: Histories,
    pub alerts: Alerts,
    pub processes: Vec<ProcessInfo>,
    pub latest: Option<Sample>,
    pub settings_open: bool,
    pub settings: SettingsForm,
    pub error: Option<String>,
}

impl Gui {
    pub fn new(event_proxy: EventLoopProxy<AppEvent>, config: &Config) -> Self {
        Self {
            event_proxy,
            theme: Theme::from_dark(config.renderer.dark_theme),
            applied_theme: None,
            histories: Histories::with_capacity(config.monitor.history_size),
            alerts: Alerts::new(config.monitor.alert_hysteresis),
            processes: Vec::new(),
            latest: None,
            settings_open: false,
            settings: SettingsForm::new(&config.monitor),
            error: None,
        }
    }

    /// Send a custom event to the event loop.
    pub fn send_event(&mut self, event: impl Into<AppEvent>) {
        let event = event.into();
        trace!("Gui event: {event:?}");
        if let Err(err) = self.event_proxy.send_event(event) {
            error!("failed to send gui event: {err:?}");
        }
    }

    /// Records a new sample and evaluates alerts against it.
    pub fn on_sample(&mut self, sample: Sample, config: &Config) {
        self.histories.push(&sample);
        self.alerts.check(&sample, &config.monitor.thresholds);
        self.latest = Some(sample);
    }

    pub fn on_processes(&mut self, processes: Vec<ProcessInfo>) {
        self.processes = processes;
    }

    /// Syncs state derived from the configuration.
    pub fn on_config_changed(&mut self, config: &Config) {
        self.histories.resize(config.monitor.history_size);
        self.alerts.set_hysteresis(config.monitor.alert_hysteresis);
        self.theme = Theme::from_dark(config.renderer.dark_theme);
        if !self.settings_open {
            self.settings = SettingsForm::new(&config.monitor);
        }
    }

    fn config_changed(&mut self, config: Config) {
        self.send_event(UiEvent::ConfigChanged(Box::new(config)));
    }

    /// Create the UI.
    pub fn ui(&mut self, ctx: &Context, config: &Config) {
        if self.applied_theme != Some(self.theme) {
            ctx.set_visuals(self.theme.visuals());
            self.applied_theme = Some(self.theme);
        }
        if ctx.input_mut(|input| input.consume_key(Modifiers::COMMAND, Key::Q)) {
            self.send_event(UiEvent::Terminate);
        }
        let palette = self.theme.palette();

        if self.error.is_some() {
            TopBottomPanel::top("error_bar").show(ctx, |ui| self.error_bar(ui, palette));
        }
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_bar(ui, config));
        if config.renderer.show_processes || config.renderer.show_alerts {
            SidePanel::right("side_panel")
                .resizable(true)
                .default_width(340.0)
                .min_width(280.0)
                .show(ctx, |ui| {
                    if config.renderer.show_processes {
                        self.process_table(ui, config, palette);
                    }
                    if config.renderer.show_alerts {
                        ui.separator();
                        self.alerts_panel(ui, palette);
                    }
                });
        }
        CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                self.metric_cards(ui, palette);
                ui.add_space(8.0);
                self.charts(ui, config, palette);
            });
        });

        let mut settings_open = self.settings_open;
        Window::new("Settings")
            .open(&mut settings_open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| self.settings_window(ui, config, palette));
        if self.settings_open && !settings_open {
            self.settings = SettingsForm::new(&config.monitor);
        }
        self.settings_open = settings_open && self.settings_open;
    }

    fn error_bar(&mut self, ui: &mut Ui, palette: &Palette) {
        ui.horizontal(|ui| {
            if let Some(error) = &self.error {
                ui.colored_label(palette.alert, error);
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Dismiss").clicked() {
                    self.error = None;
                }
            });
        });
    }

    fn status_bar(&mut self, ui: &mut Ui, config: &Config) {
        ui.horizontal(|ui| {
            ui.label(status_text(self.histories.last_update()));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("⚙ Settings").clicked() {
                    self.settings_open = !self.settings_open;
                }
                if ui.button(self.theme.toggle_label()).clicked() {
                    self.theme = self.theme.toggled();
                    let mut config = config.clone();
                    config.renderer.dark_theme = self.theme.is_dark();
                    self.config_changed(config);
                }
            });
        });
    }

    fn metric_cards(&self, ui: &mut Ui, palette: &Palette) {
        let sample = self.latest.as_ref();
        let fps = self.histories.get(Series::Fps).stats();
        let accent = |metric: Metric| {
            if self.alerts.is_alerting(metric) {
                palette.alert
            } else {
                palette.metric(metric)
            }
        };

        ui.columns(5, |columns| {
            card(
                &mut columns[0],
                palette,
                accent(Metric::Cpu),
                "CPU",
                format::percent(sample.and_then(|s| s.cpu_percent)),
                format!("Temp: {}", format::celsius(sample.and_then(|s| s.cpu_temp))),
            );
            card(
                &mut columns[1],
                palette,
                accent(Metric::Ram),
                "RAM",
                format::percent(sample.and_then(Sample::ram_percent)),
                sample.and_then(|s| s.memory).map_or_else(
                    || "N/A".to_string(),
                    |memory| {
                        format!(
                            "{} / {}",
                            format::gigabytes(memory.used),
                            format::gigabytes(memory.total)
                        )
                    },
                ),
            );
            card(
                &mut columns[2],
                palette,
                accent(Metric::Disk),
                "Disk",
                format::percent(sample.and_then(Sample::disk_percent)),
                sample.and_then(|s| s.disk_io).map_or_else(
                    || "R: N/A  W: N/A".to_string(),
                    |io| {
                        format!(
                            "R: {}  W: {}",
                            format::rate(io.input),
                            format::rate(io.output)
                        )
                    },
                ),
            );
            card(
                &mut columns[3],
                palette,
                palette.net_recv,
                "Network",
                sample.and_then(|s| s.network).map_or_else(
                    || "↓ N/A".to_string(),
                    |io| format!("↓ {}", format::rate(io.input)),
                ),
                sample.and_then(|s| s.network).map_or_else(
                    || "↑ N/A".to_string(),
                    |io| format!("↑ {}", format::rate(io.output)),
                ),
            );
            card(
                &mut columns[4],
                palette,
                palette.fps,
                "FPS",
                fps.map_or_else(
                    || "N/A".to_string(),
                    |stats| format!("{:.0}", stats.current),
                ),
                fps.map_or_else(
                    || "Avg: N/A".to_string(),
                    |stats| format!("Avg: {:.1}", stats.avg),
                ),
            );
        });
    }

    fn charts(&self, ui: &mut Ui, config: &Config, palette: &Palette) {
        let thresholds = &config.monitor.thresholds;
        let history = |series| self.histories.get(series);
        let line =
            |series: Series| Line::new(series.label(), palette.series(series), history(series));

        ui.columns(2, |columns| {
            Chart::new("CPU Usage", "%", Scale::PERCENT)
                .height(CHART_HEIGHT)
                .threshold(thresholds.cpu)
                .line(line(Series::Cpu))
                .show(&mut columns[0], palette);
            Chart::new("RAM Usage", "%", Scale::PERCENT)
                .height(CHART_HEIGHT)
                .threshold(thresholds.ram)
                .line(line(Series::Ram))
                .show(&mut columns[1], palette);
        });
        ui.add_space(8.0);
        ui.columns(2, |columns| {
            Chart::new("Disk I/O", "MB/s", Scale::Auto { floor: 10.0 })
                .height(CHART_HEIGHT)
                .line(line(Series::DiskRead).with_map(format::to_mb))
                .line(
                    Line::new(
                        Series::DiskWrite.label(),
                        palette.net_sent,
                        history(Series::DiskWrite),
                    )
                    .with_map(format::to_mb),
                )
                .show(&mut columns[0], palette);
            Chart::new("Network", "KB/s", Scale::Auto { floor: 10.0 })
                .height(CHART_HEIGHT)
                .line(line(Series::NetRecv).with_map(format::to_kb))
                .line(line(Series::NetSent).with_map(format::to_kb))
                .show(&mut columns[1], palette);
        });
        ui.add_space(8.0);
        Chart::new("FPS", "", Scale::Auto { floor: 60.0 })
            .height(CHART_HEIGHT)
            .line(line(Series::Fps))
            .show(ui, palette);
    }

    fn process_table(&mut self, ui: &mut Ui, config: &Config, palette: &Palette) {
        let sort = config.monitor.process_sort;
        ui.horizontal(|ui| {
            ui.heading("Top Processes");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button(format!("Sort: {sort}")).clicked() {
                    let mut config = config.clone();
                    config.monitor.process_sort = sort.toggled();
                    self.config_changed(config);
                }
            });
        });

        if self.processes.is_empty() {
            ui.colored_label(palette.muted, "No process data");
            return;
        }
        ui.push_id("process_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(false)
                .cell_layout(Layout::left_to_right(Align::Center))
                .column(Column::exact(56.0))
                .column(Column::remainder().clip(true))
                .column(Column::exact(64.0))
                .column(Column::exact(80.0))
                .header(20.0, |mut header| {
                    for title in ["PID", "Name", "CPU %", "Memory"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for process in &self.processes {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(process.pid.to_string());
                            });
                            row.col(|ui| {
                                ui.label(&process.name);
                            });
                            row.col(|ui| {
                                ui.label(format!("{:.1}", process.cpu_percent));
                            });
                            row.col(|ui| {
                                ui.label(format::bytes(process.memory_bytes as f64));
                            });
                        });
                    }
                });
        });
    }

    fn alerts_panel(&mut self, ui: &mut Ui, palette: &Palette) {
        ui.horizontal(|ui| {
            ui.heading("Alerts");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui
                    .add_enabled(!self.alerts.is_empty(), egui::Button::new("Clear Alerts"))
                    .clicked()
                {
                    self.alerts.clear();
                }
            });
        });
        ScrollArea::vertical()
            .id_salt("alerts")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if self.alerts.is_empty() {
                    ui.colored_label(palette.muted, "No alerts");
                }
                for alert in self.alerts.iter().rev() {
                    ui.colored_label(palette.alert, alert.to_string());
                }
            });
    }

    fn settings_window(&mut self, ui: &mut Ui, config: &Config, palette: &Palette) {
        Grid::new("settings_grid")
            .num_columns(2)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                ui.label("Update interval (ms)");
                ui.add(TextEdit::singleline(&mut self.settings.interval_ms).desired_width(80.0));
                ui.end_row();

                ui.label("History size (samples)");
                ui.add(TextEdit::singleline(&mut self.settings.history_size).desired_width(80.0));
                ui.end_row();

                for (metric, value) in Metric::ALL.into_iter().zip(&mut self.settings.thresholds) {
                    ui.label(format!("{metric} threshold ({})", metric.unit()));
                    ui.add(TextEdit::singleline(value).desired_width(80.0));
                    ui.end_row();
                }
            });

        for err in &self.settings.errors {
            ui.colored_label(palette.alert, err);
        }

        ui.separator();
        let mut renderer = config.renderer.clone();
        ui.checkbox(&mut renderer.show_processes, "Show process table");
        ui.checkbox(&mut renderer.show_alerts, "Show alerts");
        ui.checkbox(&mut renderer.vsync, "VSync");
        if renderer != config.renderer {
            let mut config = config.clone();
            config.renderer = renderer;
            self.config_changed(config);
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                let monitor = self.settings.apply(&config.monitor);
                if monitor != config.monitor {
                    let mut config = config.clone();
                    config.monitor = monitor;
                    self.config_changed(config);
                }
            }
            if ui.button("Reset to Defaults").clicked() {
                self.settings = SettingsForm::new(&MonitorConfig::default());
            }
        });
    }
}

fn card(
    ui: &mut Ui,
    palette: &Palette,
    accent: Color32,
    title: &str,
    value: String,
    detail: String,
) {
    Frame::new()
        .fill(palette.card)
        .stroke(Stroke::new(1.0, accent))
        .corner_radius(CornerRadius::same(8))
        .inner_margin(Margin::same(10))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new(title).color(palette.muted));
            ui.label(RichText::new(value).size(24.0).strong().color(accent));
            ui.label(RichText::new(detail).small());
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_bar_text() {
        assert_eq!(status_text(None), "Monitoring | Last update: Never");
        let time = Local
            .with_ymd_and_hms(2024, 5, 1, 13, 4, 5)
            .single()
            .expect("valid time");
        assert_eq!(
            status_text(Some(time)),
            "Monitoring | Last update: 13:04:05"
        );
    }

    #[test]
    fn settings_form_applies_valid_entries() {
        let config = MonitorConfig::default();
        let mut form = SettingsForm::new(&config);
        assert_eq!(form.interval_ms, "1000");
        assert_eq!(form.thresholds[0], "80");

        form.interval_ms = "500".to_string();
        form.thresholds[0] = "75.5".to_string();
        let updated = form.apply(&config);
        assert!(form.errors.is_empty(), "{:?}", form.errors);
        assert_eq!(updated.update_interval, Duration::from_millis(500));
        assert_eq!(updated.thresholds.cpu, 75.5);
    }

    #[test]
    fn settings_form_reports_invalid_entries() {
        let config = MonitorConfig::default();
        let mut form = SettingsForm::new(&config);
        form.interval_ms = "50".to_string();
        form.history_size = "lots".to_string();
        form.thresholds[1] = "120".to_string();
        form.thresholds[2] = "85".to_string();

        let updated = form.apply(&config);
        assert_eq!(form.errors.len(), 3, "{:?}", form.errors);
        assert_eq!(updated.update_interval, config.update_interval);
        assert_eq!(updated.history_size, config.history_size);
        assert_eq!(updated.thresholds.ram, config.thresholds.ram);
        assert_eq!(updated.thresholds.disk, 85.0);
    }
}
