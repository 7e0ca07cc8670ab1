/// Screen renderers
///
/// One function per `ScreenId`. Screens read the frame's `PhoneSnapshot`
/// and call `PhoneController` methods for anything that touches shared
/// phone state; app-local models live in `ScreenState`.

use super::controller::{PhoneController, PhoneSnapshot};
use super::router::{self, ScreenId};
use super::widgets::{self, PatternView};
use crate::apps::calculator::Operator;
use crate::apps::calendar::month_label;
use crate::apps::dialer::{caller_initial, format_call_duration, KEYPAD};
use crate::apps::recorder::format_time;
use crate::apps::{Agenda, Calculator, ContactBook, Dialer, HighScoreStore, Inbox, TapGame};
use crate::config::storage::KeyValueFile;
use crate::hardware::network::MAX_CELL_STRENGTH;
use crate::hardware::ram::storage_breakdown;
use crate::lifecycle::GalleryViewer;
use crate::models::AppId;
use chrono::Duration as ChronoDuration;
use eframe::egui;
use egui::{Color32, RichText, Vec2};
use std::time::Instant;

/// App-local state that survives between frames.
pub struct ScreenState {
    pub dialer: Dialer,
    pub calculator: Calculator,
    pub agenda: Agenda,
    pub new_event_title: String,
    pub new_event_time: String,
    pub contacts: ContactBook,
    pub contact_search: String,
    pub new_contact: [String; 3],
    pub inbox: Inbox,
    pub composer: String,
    pub game: TapGame,
    pub viewer: GalleryViewer,
    /// When the current call was first seen active
    pub call_started: Option<Instant>,
}

impl Default for ScreenState {
    fn default() -> Self {
        let high_scores = match KeyValueFile::global() {
            Ok(file) => Some(HighScoreStore::new(file)),
            Err(e) => {
                log::warn!("[Game] High score will not persist: {}", e);
                None
            }
        };
        ScreenState {
            dialer: Dialer::new(),
            calculator: Calculator::new(),
            agenda: Agenda::default(),
            new_event_title: String::new(),
            new_event_time: String::new(),
            contacts: ContactBook::new(),
            contact_search: String::new(),
            new_contact: Default::default(),
            inbox: Inbox::new(),
            composer: String::new(),
            game: TapGame::new(high_scores),
            viewer: GalleryViewer::default(),
            call_started: None,
        }
    }
}

pub fn render_screen(
    ui: &mut egui::Ui,
    screen: ScreenId,
    snap: &PhoneSnapshot,
    controller: &PhoneController,
    state: &mut ScreenState,
) {
    match screen {
        ScreenId::Lock => render_lock(ui, snap, controller),
        ScreenId::Home => render_home(ui, controller),
        ScreenId::Phone => render_phone(ui, snap, controller, state),
        ScreenId::Camera => render_camera(ui, snap, controller),
        ScreenId::Microphone => render_microphone(ui, controller),
        ScreenId::Battery => render_battery(ui, snap, controller),
        ScreenId::Connectivity => render_connectivity(ui, snap, controller),
        ScreenId::Memory => render_memory(ui, snap, controller),
        ScreenId::Gallery => render_gallery(ui, controller, state),
        ScreenId::Game => render_game(ui, controller, state),
        ScreenId::Calculator => render_calculator(ui, state),
        ScreenId::Calendar => render_calendar(ui, state),
        ScreenId::Contacts => render_contacts(ui, controller, state),
        ScreenId::Messages => render_messages(ui, state),
        ScreenId::Manual => render_manual(ui),
        ScreenId::WebView(app) => render_webview(ui, app),
    }
}

fn title(ui: &mut egui::Ui, text: &str) {
    ui.add_space(6.0);
    ui.heading(text);
    ui.separator();
}

fn render_lock(ui: &mut egui::Ui, snap: &PhoneSnapshot, controller: &PhoneController) {
    ui.vertical_centered(|ui| {
        ui.add_space(30.0);
        ui.label(RichText::new(snap.clock.format("%H:%M").to_string()).size(48.0));
        ui.label(snap.clock.format("%A, %-d %B").to_string());
        ui.add_space(30.0);

        let status = match snap.unlock_result {
            Some(true) => RichText::new("Desbloqueando...").color(Color32::from_rgb(46, 204, 113)),
            Some(false) => RichText::new("Patrón incorrecto").color(Color32::from_rgb(231, 76, 60)),
            None => RichText::new("Dibuja el patrón para desbloquear"),
        };
        ui.label(status);
        ui.add_space(10.0);

        let view = PatternView {
            selected: &snap.unlock_attempt,
            result: snap.unlock_result,
        };
        if let Some(point) = widgets::pattern_grid(ui, view) {
            controller.select_unlock_point(point);
        }

        ui.add_space(10.0);
        if ui.button("Borrar").clicked() {
            controller.clear_unlock();
        }
    });
}

fn render_home(ui: &mut egui::Ui, controller: &PhoneController) {
    ui.add_space(10.0);
    egui::Grid::new("home_grid")
        .spacing(Vec2::new(12.0, 12.0))
        .show(ui, |ui| {
            for (i, app) in AppId::ALL.iter().enumerate() {
                let button = egui::Button::new(app.home_label()).min_size(Vec2::new(80.0, 56.0));
                if ui.add(button).clicked() {
                    controller.open_app(*app);
                }
                if i % 4 == 3 {
                    ui.end_row();
                }
            }
        });
}

fn render_phone(
    ui: &mut egui::Ui,
    snap: &PhoneSnapshot,
    controller: &PhoneController,
    state: &mut ScreenState,
) {
    let call = &snap.navigation.call;
    if call.active {
        let started = *state.call_started.get_or_insert_with(Instant::now);
        ui.vertical_centered(|ui| {
            ui.add_space(30.0);
            let initial = caller_initial(call.name.as_deref(), call.number.as_deref());
            ui.label(RichText::new(initial).size(40.0));
            ui.heading(call.display_name());
            ui.label(format_call_duration(started.elapsed().as_secs()));
            ui.add_space(30.0);
            if ui
                .add(egui::Button::new("Colgar").fill(Color32::from_rgb(231, 76, 60)))
                .clicked()
            {
                controller.end_call();
            }
        });
        return;
    }
    state.call_started = None;

    title(ui, "Teléfono");
    ui.horizontal(|ui| {
        ui.label(RichText::new(state.dialer.number()).size(26.0).monospace());
        if ui.small_button("⌫").clicked() {
            state.dialer.backspace();
        }
    });
    egui::Grid::new("keypad").show(ui, |ui| {
        for (i, key) in KEYPAD.iter().enumerate() {
            if ui.add(egui::Button::new(*key).min_size(Vec2::splat(48.0))).clicked() {
                state.dialer.press(key, call.active);
            }
            if i % 3 == 2 {
                ui.end_row();
            }
        }
    });
    let number = state.dialer.dial().map(str::to_string);
    if ui
        .add_enabled(number.is_some(), egui::Button::new("Llamar"))
        .clicked()
    {
        if let Some(number) = number {
            let _ = controller.simulate_call(&number, None);
        }
    }
}

fn render_camera(ui: &mut egui::Ui, snap: &PhoneSnapshot, controller: &PhoneController) {
    title(ui, "Cámara");
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), 260.0), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 8.0, Color32::from_gray(20));
    let caption = if snap.camera_active {
        "Vista previa"
    } else if let Some(err) = controller.camera.last_error() {
        camera_error_caption(&err)
    } else {
        "Iniciando cámara..."
    };
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        caption,
        egui::FontId::proportional(16.0),
        Color32::LIGHT_GRAY,
    );

    ui.add_space(8.0);
    ui.vertical_centered(|ui| {
        if ui
            .add_enabled(snap.camera_active, egui::Button::new("📷 Tomar foto"))
            .clicked()
        {
            let _ = controller.take_photo();
        }
    });
}

fn camera_error_caption(err: &crate::error::CapabilityError) -> &'static str {
    match err {
        crate::error::CapabilityError::PermissionDenied => "Permiso de cámara denegado",
        crate::error::CapabilityError::NotSupported => "Cámara no disponible",
        crate::error::CapabilityError::DeviceError(_) => "Error de la cámara",
    }
}

fn render_microphone(ui: &mut egui::Ui, controller: &PhoneController) {
    title(ui, "Grabadora");
    let recording = controller.is_recording();
    {
        let recorder = controller
            .recorder
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(format_time(recorder.elapsed_secs())).size(32.0));
            ui.add(egui::ProgressBar::new(recorder.level() / 100.0).desired_width(200.0));
        });
    }
    ui.vertical_centered(|ui| {
        let label = if recording { "⏹ Detener" } else { "⏺ Grabar" };
        if ui.button(label).clicked() {
            controller.toggle_recording();
        }
    });
    ui.separator();

    let mut recorder = controller
        .recorder
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let entries: Vec<_> = recorder.recordings().to_vec();
    if entries.is_empty() {
        ui.label("No hay grabaciones");
    }
    for rec in entries {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Grabación {} · {} · {}",
                rec.id,
                format_time(rec.duration_secs),
                rec.created_at.format("%H:%M")
            ));
            let playing = recorder.playing() == Some(rec.id);
            if ui.small_button(if playing { "⏸" } else { "▶" }).clicked() {
                recorder.toggle_play(rec.id);
            }
            if ui.small_button("🗑").clicked() {
                recorder.delete(rec.id);
            }
        });
    }
}

fn render_battery(ui: &mut egui::Ui, snap: &PhoneSnapshot, controller: &PhoneController) {
    title(ui, "Batería");
    let device = &snap.device;
    ui.vertical_centered(|ui| {
        let label = if device.is_charging { "Cargando" } else { "En uso" };
        widgets::radial_gauge(ui, device.battery_percentage() as f32, label);
        let hours = device.battery_estimate_hours();
        ui.label(if device.is_charging {
            format!("Carga completa en ~{} h", hours)
        } else {
            format!("Duración estimada: ~{} h", hours)
        });
    });
    ui.separator();
    let mut charging = device.is_charging;
    if ui.checkbox(&mut charging, "Conectado al cargador").changed() {
        controller.set_charging(charging);
    }
}

fn render_connectivity(ui: &mut egui::Ui, snap: &PhoneSnapshot, controller: &PhoneController) {
    title(ui, "Wi-Fi y Datos");
    let wifi = &snap.device.wifi;
    let cell = &snap.device.cellular;

    ui.horizontal(|ui| {
        let mut on = wifi.connected;
        if ui.toggle_value(&mut on, "Wi-Fi").changed() {
            controller.toggle_wifi();
        }
        if wifi.connected {
            ui.label(format!(
                "{} · {} · {}",
                wifi.ssid.as_deref().unwrap_or("-"),
                wifi.ip,
                wifi.quality_label()
            ));
        } else {
            ui.label("Desconectado");
        }
    });

    ui.horizontal(|ui| {
        let mut on = cell.connected;
        if ui.toggle_value(&mut on, "Datos móviles").changed() {
            controller.toggle_cellular();
        }
        widgets::signal_bars(ui, cell.strength, MAX_CELL_STRENGTH, cell.connected);
        ui.label(format!("{} · {}", cell.operator, cell.quality_label()));
    });
}

fn render_memory(ui: &mut egui::Ui, snap: &PhoneSnapshot, controller: &PhoneController) {
    title(ui, "Almacenamiento");
    let device = &snap.device;
    widgets::usage_bar(ui, device.storage.used_gb, device.storage.total_gb, "Almacenamiento");
    for (name, gb) in storage_breakdown() {
        ui.label(format!("  {}: {:.1} GB", name, gb));
    }
    ui.add_space(8.0);
    widgets::usage_bar(ui, device.ram.used_gb, device.ram.total_gb, "Memoria RAM");
    ui.separator();

    ui.label(RichText::new("Aplicaciones en ejecución").strong());
    for app in &device.running_apps {
        ui.horizontal(|ui| {
            ui.label(format!("{} · {:.1} GB", app.name, app.ram_gb));
            if !app.is_protected() && ui.small_button("Cerrar").clicked() {
                let _ = controller.terminate_app(&app.name);
            }
        });
    }
}

fn render_gallery(ui: &mut egui::Ui, controller: &PhoneController, state: &mut ScreenState) {
    let photos = controller.photos();

    if let Some(index) = state.viewer.index() {
        let Some(url) = photos.get(index) else {
            state.viewer.close();
            return;
        };
        ui.horizontal(|ui| {
            if ui.button("← Volver").clicked() {
                state.viewer.close();
            }
            ui.label(format!("{} / {}", index + 1, photos.len()));
            if ui.button("🗑 Eliminar").clicked() {
                if let Some(len_before) = controller.delete_photo(index) {
                    state.viewer.on_deleted(index, len_before);
                }
            }
        });
        let size = Vec2::new(ui.available_width(), 360.0);
        widgets::photo_tile(ui, url, "", size);
        ui.horizontal(|ui| {
            if ui.button("◀").clicked() {
                state.viewer.prev(photos.len());
            }
            if ui.button("▶").clicked() {
                state.viewer.next(photos.len());
            }
        });
        return;
    }

    title(ui, "Galería");
    if photos.is_empty() {
        ui.label("No hay fotos");
        return;
    }
    egui::Grid::new("gallery_grid").show(ui, |ui| {
        for (i, url) in photos.iter().enumerate() {
            if widgets::photo_tile(ui, url, &format!("Foto {}", i + 1), Vec2::splat(100.0)).clicked() {
                state.viewer.open(i, photos.len());
            }
            if i % 3 == 2 {
                ui.end_row();
            }
        }
    });
}

fn render_game(ui: &mut egui::Ui, controller: &PhoneController, state: &mut ScreenState) {
    title(ui, "Clic de Colores");
    ui.label(format!(
        "Puntos: {}   Récord: {}",
        state.game.score(),
        state.game.high_score()
    ));
    ui.add_space(20.0);
    ui.vertical_centered(|ui| {
        let button = egui::Button::new(RichText::new("¡Toca!").size(24.0))
            .fill(widgets::hex_color(state.game.color()))
            .min_size(Vec2::splat(140.0));
        if ui.add(button).clicked() {
            if let Err(e) = state.game.tap() {
                controller.report_config_error(e);
            }
        }
        ui.add_space(10.0);
        if ui.button("Reiniciar").clicked() {
            state.game.reset();
        }
    });
}

fn render_calculator(ui: &mut egui::Ui, state: &mut ScreenState) {
    let calc = &mut state.calculator;
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
        ui.label(RichText::new(calc.display()).size(40.0).monospace());
    });
    ui.separator();

    let key = |ui: &mut egui::Ui, text: &str| {
        ui.add(egui::Button::new(text).min_size(Vec2::splat(54.0)))
            .clicked()
    };
    egui::Grid::new("calc_keys").show(ui, |ui| {
        if key(ui, calc.clear_label()) {
            calc.clear();
        }
        if key(ui, "±") {
            calc.toggle_sign();
        }
        if key(ui, "%") {
            calc.percent();
        }
        if key(ui, Operator::Divide.symbol()) {
            calc.input_operator(Operator::Divide);
        }
        ui.end_row();

        let rows = [
            (['7', '8', '9'], Operator::Multiply),
            (['4', '5', '6'], Operator::Subtract),
            (['1', '2', '3'], Operator::Add),
        ];
        for (digits, op) in rows {
            for d in digits {
                if key(ui, &d.to_string()) {
                    calc.input_digit(d);
                }
            }
            if key(ui, op.symbol()) {
                calc.input_operator(op);
            }
            ui.end_row();
        }

        if key(ui, "0") {
            calc.input_digit('0');
        }
        if key(ui, ".") {
            calc.input_decimal();
        }
        ui.label("");
        if key(ui, "=") {
            calc.equals();
        }
        ui.end_row();
    });
}

fn render_calendar(ui: &mut egui::Ui, state: &mut ScreenState) {
    let selected = state.agenda.selected();
    ui.horizontal(|ui| {
        if ui.button("◀").clicked() {
            state.agenda.select(selected - ChronoDuration::days(1));
        }
        ui.heading(format!("{} · {}", selected.format("%-d"), month_label(selected)));
        if ui.button("▶").clicked() {
            state.agenda.select(selected + ChronoDuration::days(1));
        }
        let mut picked = selected;
        ui.add(egui_extras::DatePickerButton::new(&mut picked).id_source("agenda_date"));
        if picked != selected {
            state.agenda.select(picked);
        }
    });
    ui.separator();

    let events: Vec<_> = state
        .agenda
        .events_for_selected()
        .into_iter()
        .cloned()
        .collect();
    if events.is_empty() {
        ui.label("Sin eventos");
    }
    for event in events {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} {}",
                event.time.as_deref().unwrap_or("Todo el día"),
                event.title
            ));
            if ui.small_button("🗑").clicked() {
                state.agenda.delete(event.id);
            }
        });
    }

    ui.separator();
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut state.new_event_title);
        ui.add(egui::TextEdit::singleline(&mut state.new_event_time).desired_width(50.0).hint_text("hh:mm"));
        if ui.button("Añadir").clicked() {
            let time = Some(state.new_event_time.as_str());
            if state.agenda.add(&state.new_event_title, time).is_some() {
                state.new_event_title.clear();
                state.new_event_time.clear();
            }
        }
    });
}

fn render_contacts(ui: &mut egui::Ui, controller: &PhoneController, state: &mut ScreenState) {
    title(ui, "Contactos");
    ui.add(egui::TextEdit::singleline(&mut state.contact_search).hint_text("Buscar"));

    let matches: Vec<_> = state
        .contacts
        .search(&state.contact_search)
        .into_iter()
        .cloned()
        .collect();
    for contact in matches {
        ui.horizontal(|ui| {
            ui.label(RichText::new(contact.initials()).strong());
            ui.label(format!("{} · {}", contact.name, contact.phone));
            if ui.small_button("📞").clicked() {
                let _ = controller.simulate_call(&contact.phone, Some(&contact.name));
            }
            if ui.small_button("🗑").clicked() {
                state.contacts.delete(contact.id);
            }
        });
    }

    ui.separator();
    let [name, phone, email] = &mut state.new_contact;
    ui.add(egui::TextEdit::singleline(name).hint_text("Nombre"));
    ui.add(egui::TextEdit::singleline(phone).hint_text("Teléfono"));
    ui.add(egui::TextEdit::singleline(email).hint_text("Correo (opcional)"));
    if ui.button("Guardar contacto").clicked() {
        let email = Some(email.as_str()).filter(|e| !e.trim().is_empty());
        if state.contacts.add(name, phone, email).is_some() {
            state.new_contact = Default::default();
        } else {
            controller.notify(crate::models::Notice::error("Nombre y teléfono son obligatorios"));
        }
    }
}

fn render_messages(ui: &mut egui::Ui, state: &mut ScreenState) {
    if let Some(conv) = state.inbox.active().cloned() {
        ui.horizontal(|ui| {
            if ui.button("←").clicked() {
                state.inbox.close();
            }
            ui.heading(&conv.name);
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for msg in &conv.messages {
                    let layout = if msg.is_me {
                        egui::Layout::right_to_left(egui::Align::Min)
                    } else {
                        egui::Layout::left_to_right(egui::Align::Min)
                    };
                    ui.with_layout(layout, |ui| {
                        ui.label(format!("{}  ({})", msg.text, msg.time));
                    });
                }
            });
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(&mut state.composer);
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Enviar").clicked() || enter) && state.inbox.send(&state.composer) {
                state.composer.clear();
            }
        });
        return;
    }

    title(ui, "Mensajes");
    let conversations = state.inbox.conversations().to_vec();
    for conv in conversations {
        let unread = if conv.unread > 0 {
            format!(" ({})", conv.unread)
        } else {
            String::new()
        };
        let text = format!("{}{} · {}\n{}", conv.name, unread, conv.time, conv.last_message);
        if ui.selectable_label(false, text).clicked() {
            state.inbox.open(conv.id);
        }
    }
}

fn render_manual(ui: &mut egui::Ui) {
    title(ui, "Manual");
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.label("• Dibuja el patrón en la pantalla de bloqueo para desbloquear.");
        ui.label("• Pulsa Inicio para volver a la pantalla principal.");
        ui.label("• El botón de recientes muestra las últimas aplicaciones abiertas.");
        ui.label("• Mantén el botón de encendido para apagar o reiniciar.");
        ui.label("• En Almacenamiento puedes cerrar aplicaciones para liberar RAM.");
        ui.label("• Las fotos de la cámara se guardan en la galería.");
    });
}

fn render_webview(ui: &mut egui::Ui, app: AppId) {
    let Some(url) = router::webview_url(app) else {
        return;
    };
    title(ui, router::page_title(url));
    ui.label(RichText::new(url).monospace());
    ui.add_space(8.0);
    ui.hyperlink_to("Abrir en el navegador", url);
}
