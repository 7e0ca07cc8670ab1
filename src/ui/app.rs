/// Main App and UI State Management
///
/// This module provides the eframe::App implementation for the phone frame.
/// Each frame takes one `PhoneSnapshot`, resolves the screen through the
/// router and draws the chrome around it: status bar, navigation bar,
/// power controls, recents overlay, toasts and the debug log panel.

use super::controller::{PhoneController, PhoneSnapshot};
use super::router::ScreenId;
use super::screens::{self, ScreenState};
use super::widgets;
use crate::hardware::network::MAX_CELL_STRENGTH;
use crate::log_collector::{LogKind, LogLine};
use crate::models::{Notice, NoticeLevel};
use eframe::egui;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a toast stays visible.
const TOAST_TTL: Duration = Duration::from_secs(3);
/// Lines kept by the debug log panel.
const MAX_LOG_LINES: usize = 2000;

/// Transient UI state - state that doesn't persist across sessions
pub struct UIState {
    /// Per-app models
    pub screens: ScreenState,

    /// Toasts currently shown, with the instant they appeared
    pub toasts: Vec<(Notice, Instant)>,

    /// Debug log buffer (fixed-size VecDeque of last N lines for O(1) appends)
    pub log_lines: VecDeque<String>,

    /// Whether the debug log panel is visible
    pub show_log: bool,

    /// Last lifecycle line, shown in the log panel header
    pub last_event: String,

    /// Number typed in the debug "incoming call" field
    pub debug_caller: String,

    /// Phone visuals are installed once, on the first frame
    pub visuals_applied: bool,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            screens: ScreenState::default(),
            toasts: Vec::new(),
            log_lines: VecDeque::with_capacity(MAX_LOG_LINES),
            show_log: false,
            last_event: String::new(),
            debug_caller: "04141234567".to_string(),
            visuals_applied: false,
        }
    }
}

/// Main Application UI Structure
pub struct PhoneApp {
    pub controller: Arc<PhoneController>,

    pub ui_state: UIState,

    /// Lines from the log collector for the debug panel
    pub log_rx: Option<tokio::sync::mpsc::Receiver<LogLine>>,

    /// Context handle for requesting repaints from background tasks
    pub ctx_handle: Option<egui::Context>,
}

impl PhoneApp {
    pub fn new(
        controller: Arc<PhoneController>,
        log_rx: Option<tokio::sync::mpsc::Receiver<LogLine>>,
    ) -> Self {
        Self {
            controller,
            ui_state: UIState::default(),
            log_rx,
            ctx_handle: None,
        }
    }

    /// Drain log lines into the panel buffer
    fn process_log_lines(&mut self) {
        let Some(rx) = self.log_rx.as_mut() else {
            return;
        };
        while let Ok(line) = rx.try_recv() {
            if line.kind == LogKind::Parsed {
                self.ui_state.last_event = line.message.clone();
            }
            self.ui_state
                .log_lines
                .push_back(format!("[{}] {}", line.timestamp, line.message));
            while self.ui_state.log_lines.len() > MAX_LOG_LINES {
                self.ui_state.log_lines.pop_front();
            }
        }
    }

    /// Move new notices into toasts and expire old ones
    fn process_notices(&mut self) {
        let now = Instant::now();
        for notice in self.controller.drain_notices() {
            self.ui_state.toasts.push((notice, now));
        }
        self.ui_state
            .toasts
            .retain(|(_, shown)| now.duration_since(*shown) < TOAST_TTL);
    }

    fn render_status_bar(&self, ctx: &egui::Context, snap: &PhoneSnapshot) {
        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(snap.clock.format("%H:%M").to_string());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let device = &snap.device;
                    let pct = device.battery_percentage();
                    let icon = if device.is_charging { "⚡" } else { "🔋" };
                    ui.colored_label(widgets::level_color(pct as f32), format!("{}{}%", icon, pct));
                    if device.wifi.connected {
                        ui.label("📶 Wi-Fi");
                    }
                    widgets::signal_bars(
                        ui,
                        device.cellular.strength,
                        MAX_CELL_STRENGTH,
                        device.cellular.connected,
                    );
                });
            });
        });
    }

    fn render_nav_bar(&self, ctx: &egui::Context, snap: &PhoneSnapshot) {
        let usable = snap.navigation.power.is_on() && !snap.navigation.is_locked;
        egui::TopBottomPanel::bottom("nav_bar").show(ctx, |ui| {
            ui.add_enabled_ui(usable, |ui| {
                ui.columns(3, |cols| {
                    if cols[0].button("◀ Atrás").clicked() {
                        self.controller.go_back();
                    }
                    if cols[1].button("⬤ Inicio").clicked() {
                        self.controller.go_home();
                    }
                    if cols[2].button("▦ Recientes").clicked() {
                        self.controller.toggle_recents();
                    }
                });
            });
        });
    }

    /// Side buttons and debug controls outside the phone frame
    fn render_side_panel(&mut self, ctx: &egui::Context, snap: &PhoneSnapshot) {
        egui::SidePanel::right("side_buttons")
            .resizable(false)
            .default_width(170.0)
            .show(ctx, |ui| {
                ui.heading("Botones");
                ui.label(format!("Estado: {}", snap.navigation.mode().as_str()));
                ui.separator();

                if ui.button("⏻ Encendido").clicked() {
                    let _ = self.controller.press_power_button();
                }
                if ui
                    .add_enabled(!snap.navigation.power.is_transient(), egui::Button::new("↻ Reiniciar"))
                    .clicked()
                {
                    let _ = self.controller.restart_phone();
                }
                if ui
                    .add_enabled(snap.navigation.power.is_on(), egui::Button::new("🔒 Bloquear"))
                    .clicked()
                {
                    self.controller.lock();
                }

                ui.separator();
                ui.label("Simular llamada");
                ui.text_edit_singleline(&mut self.ui_state.debug_caller);
                let caller = self.ui_state.debug_caller.trim().to_string();
                if ui
                    .add_enabled(!caller.is_empty(), egui::Button::new("📞 Llamada entrante"))
                    .clicked()
                {
                    let _ = self.controller.simulate_call(&caller, None);
                }

                ui.separator();
                ui.checkbox(&mut self.ui_state.show_log, "Mostrar registro");
                ui.label(
                    egui::RichText::new(format!("RAM drift: {:+.2} GB", snap.device.ram_drift()))
                        .small()
                        .monospace(),
                );
            });
    }

    fn render_log_panel(&self, ctx: &egui::Context) {
        if !self.ui_state.show_log {
            return;
        }
        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(&self.ui_state.last_event).strong());
                let text: String = self
                    .ui_state
                    .log_lines
                    .iter()
                    .map(|l| format!("{}\n", l))
                    .collect();
                widgets::terminal_viewport(ui, &text);
            });
    }

    fn render_power_overlay(&self, ui: &mut egui::Ui, snap: &PhoneSnapshot) -> bool {
        let nav = &snap.navigation;
        let message = if nav.is_restarting() && !nav.is_shut_down() {
            "Reiniciando..."
        } else if nav.is_powering_off() {
            "Apagando..."
        } else {
            return false;
        };
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 2.0 - 20.0);
            ui.add(egui::Spinner::new());
            ui.label(message);
        });
        true
    }

    fn render_recents(&self, ctx: &egui::Context, snap: &PhoneSnapshot) {
        if !snap.navigation.is_recents_open {
            return;
        }
        egui::Window::new("Recientes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                if snap.recents.is_empty() {
                    ui.label("No hay aplicaciones recientes");
                }
                for recent in &snap.recents {
                    if ui.button(recent.name).clicked() {
                        self.controller.open_recent(recent.id);
                    }
                }
                ui.separator();
                if ui.button("Cerrar").clicked() {
                    self.controller.close_recents();
                }
            });
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        for (i, (notice, _)) in self.ui_state.toasts.iter().enumerate() {
            let color = match notice.level {
                NoticeLevel::Error => egui::Color32::from_rgb(255, 100, 100),
                NoticeLevel::Success => egui::Color32::from_rgb(100, 255, 100),
                NoticeLevel::Info => egui::Color32::from_rgb(100, 150, 255),
            };
            egui::Area::new(egui::Id::new(("toast", i)))
                .anchor(egui::Align2::CENTER_TOP, egui::Vec2::new(0.0, 40.0 + 32.0 * i as f32))
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(color, &notice.message);
                    });
                });
        }
    }

    fn render_content(&mut self, ctx: &egui::Context, snap: &PhoneSnapshot) {
        let frame = match snap.screen {
            None => egui::Frame::default().fill(egui::Color32::BLACK),
            Some(_) => egui::Frame::central_panel(&ctx.style()),
        };
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            if self.render_power_overlay(ui, snap) {
                return;
            }
            match snap.screen {
                None => {
                    // Restart dark phase shows nothing at all
                    if snap.navigation.power == crate::lifecycle::PowerState::ShutDown {
                        ui.vertical_centered(|ui| {
                            ui.add_space(ui.available_height() / 2.0 - 20.0);
                            if ui.button("⏻ Encender").clicked() {
                                let _ = self.controller.power_on();
                            }
                        });
                    }
                }
                Some(screen) => {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        screens::render_screen(
                            ui,
                            screen,
                            snap,
                            &self.controller,
                            &mut self.ui_state.screens,
                        );
                    });
                    if screen == ScreenId::Microphone && self.controller.is_recording() {
                        ctx.request_repaint_after(Duration::from_millis(100));
                    }
                }
            }
        });
    }

    fn phone_visuals() -> egui::Visuals {
        let mut visuals = egui::Visuals::dark();
        let accent = egui::Color32::from_rgb(0x34, 0x98, 0xdb);
        let background = egui::Color32::from_rgb(0x1c, 0x1f, 0x24);

        visuals.panel_fill = background;
        visuals.window_fill = background;
        visuals.selection.bg_fill = accent;
        visuals.widgets.active.bg_fill = accent;
        visuals.hyperlink_color = accent;
        visuals
    }
}

impl eframe::App for PhoneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.ctx_handle.is_none() {
            self.ctx_handle = Some(ctx.clone());
            self.controller.set_ui_context(ctx.clone());
        }
        if !self.ui_state.visuals_applied {
            ctx.set_visuals(Self::phone_visuals());
            self.ui_state.visuals_applied = true;
        }

        self.process_log_lines();
        self.process_notices();

        let snap = self.controller.snapshot();

        self.render_side_panel(ctx, &snap);
        self.render_log_panel(ctx);
        if snap.screen.is_some() {
            self.render_status_bar(ctx, &snap);
            self.render_nav_bar(ctx, &snap);
        }
        self.render_content(ctx, &snap);
        self.render_recents(ctx, &snap);
        self.render_toasts(ctx);

        // Clock tick and toast expiry
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
