/// Custom egui Widgets
///
/// Painter-based pieces of the phone UI:
/// - radial_gauge: battery level ring
/// - usage_bar: used/total bar for RAM and storage
/// - pattern_grid: 3x3 lock screen grid
/// - photo_tile: gallery thumbnail
/// - terminal_viewport: monospace log viewer

use crate::apps::game::parse_hex_color;
use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

/// Red below 20%, amber below 50%, green otherwise.
pub fn level_color(percent: f32) -> Color32 {
    if percent < 20.0 {
        Color32::from_rgb(231, 76, 60)
    } else if percent < 50.0 {
        Color32::from_rgb(243, 156, 18)
    } else {
        Color32::from_rgb(46, 204, 113)
    }
}

pub fn hex_color(hex: &str) -> Color32 {
    match parse_hex_color(hex) {
        Some([r, g, b]) => Color32::from_rgb(r, g, b),
        None => Color32::GRAY,
    }
}

/// Fill colour of a placeholder photo data URL (`fill='%23rrggbb'`).
pub fn photo_fill(url: &str) -> Option<Color32> {
    let start = url.find("fill='%23")? + "fill='%23".len();
    let digits = url.get(start..start + 6)?;
    let [r, g, b] = parse_hex_color(&format!("#{}", digits))?;
    Some(Color32::from_rgb(r, g, b))
}

/// Draws a radial gauge (circular progress indicator) with a label below
pub fn radial_gauge(ui: &mut egui::Ui, percent: f32, label: &str) {
    let (response, painter) = ui.allocate_painter(Vec2::new(140.0, 160.0), egui::Sense::hover());

    let gauge_rect = response.rect;
    let center = Pos2::new(gauge_rect.center().x, gauge_rect.top() + 70.0);
    let radius = 60.0;
    let normalized = (percent / 100.0).clamp(0.0, 1.0);
    let fill_color = level_color(percent);

    painter.circle_stroke(center, radius, Stroke::new(3.0, Color32::from_gray(100)));

    // -135° sweep of 270°
    let start_angle = -std::f32::consts::PI * 0.75;
    let end_angle = start_angle + std::f32::consts::PI * 1.5 * normalized;
    let segments = (50.0 * normalized) as usize + 2;
    let arc_radius = radius - 2.0;

    for i in 0..segments {
        let t0 = i as f32 / (segments - 1).max(1) as f32;
        let t1 = (i + 1) as f32 / (segments - 1).max(1) as f32;
        let angle0 = start_angle + (end_angle - start_angle) * t0;
        let angle1 = start_angle + (end_angle - start_angle) * t1;
        let p0 = center + Vec2::new(angle0.cos() * arc_radius, angle0.sin() * arc_radius);
        let p1 = center + Vec2::new(angle1.cos() * arc_radius, angle1.sin() * arc_radius);
        painter.line_segment([p0, p1], Stroke::new(6.0, fill_color));
    }

    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        format!("{:.0}%", percent),
        egui::FontId::new(22.0, egui::FontFamily::Proportional),
        Color32::WHITE,
    );
    painter.text(
        Pos2::new(gauge_rect.center().x, center.y + radius + 10.0),
        egui::Align2::CENTER_TOP,
        label,
        egui::FontId::new(11.0, egui::FontFamily::Proportional),
        Color32::LIGHT_GRAY,
    );
}

/// Horizontal used/total bar with a caption.
pub fn usage_bar(ui: &mut egui::Ui, used: f32, total: f32, caption: &str) {
    let fraction = if total > 0.0 { (used / total).clamp(0.0, 1.0) } else { 0.0 };
    ui.label(caption);
    ui.add(
        egui::ProgressBar::new(fraction)
            .text(format!("{:.1} / {:.0} GB ({:.0}%)", used, total, fraction * 100.0))
            .fill(level_color(100.0 - fraction * 100.0)),
    );
}

/// Signal bars, `strength` out of `max`.
pub fn signal_bars(ui: &mut egui::Ui, strength: u8, max: u8, active: bool) {
    let (response, painter) = ui.allocate_painter(Vec2::new(18.0, 12.0), egui::Sense::hover());
    let rect = response.rect;
    let bar_width = rect.width() / max.max(1) as f32;
    for i in 0..max {
        let height = rect.height() * (i + 1) as f32 / max as f32;
        let bar = Rect::from_min_max(
            Pos2::new(rect.left() + i as f32 * bar_width, rect.bottom() - height),
            Pos2::new(rect.left() + (i as f32 + 0.7) * bar_width, rect.bottom()),
        );
        let lit = active && i < strength;
        painter.rect_filled(
            bar,
            0.0,
            if lit { Color32::WHITE } else { Color32::from_gray(80) },
        );
    }
}

/// Visual state of the lock grid.
pub struct PatternView<'a> {
    pub selected: &'a [u8],
    pub result: Option<bool>,
}

/// 3x3 lock grid. Returns the point clicked or dragged over this frame.
pub fn pattern_grid(ui: &mut egui::Ui, view: PatternView<'_>) -> Option<u8> {
    let size = 240.0;
    let (response, painter) =
        ui.allocate_painter(Vec2::splat(size), egui::Sense::click_and_drag());
    let rect = response.rect;
    let cell = size / 3.0;
    let center_of = |point: u8| {
        let (row, col) = (point / 3, point % 3);
        Pos2::new(
            rect.left() + cell * (col as f32 + 0.5),
            rect.top() + cell * (row as f32 + 0.5),
        )
    };

    let accent = match view.result {
        Some(true) => Color32::from_rgb(46, 204, 113),
        Some(false) => Color32::from_rgb(231, 76, 60),
        None => Color32::from_rgb(52, 152, 219),
    };

    for pair in view.selected.windows(2) {
        painter.line_segment([center_of(pair[0]), center_of(pair[1])], Stroke::new(4.0, accent));
    }
    for point in 0..9u8 {
        let selected = view.selected.contains(&point);
        painter.circle_filled(
            center_of(point),
            if selected { 16.0 } else { 12.0 },
            if selected { accent } else { Color32::from_gray(160) },
        );
    }

    let pointer = response.interact_pointer_pos()?;
    if !(response.clicked() || response.dragged()) {
        return None;
    }
    (0..9u8).find(|p| center_of(*p).distance(pointer) < cell * 0.3)
}

/// Gallery thumbnail. Returns the click response.
pub fn photo_tile(ui: &mut egui::Ui, url: &str, label: &str, size: Vec2) -> egui::Response {
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
    let rect = response.rect;
    painter.rect_filled(rect, 6.0, photo_fill(url).unwrap_or(Color32::DARK_GRAY));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        egui::FontId::new(12.0, egui::FontFamily::Proportional),
        Color32::WHITE,
    );
    if response.hovered() {
        painter.rect_stroke(rect, 6.0, Stroke::new(2.0, Color32::WHITE));
    }
    response
}

/// Terminal-style log viewer with monospace font
pub fn terminal_viewport(ui: &mut egui::Ui, log_content: &str) {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.monospace(if log_content.is_empty() {
                "Awaiting output..."
            } else {
                log_content
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::capture::placeholder_photo;

    #[test]
    fn test_photo_fill_reads_placeholder_color() {
        let url = placeholder_photo("#e74c3c", "Foto");
        assert_eq!(photo_fill(&url), Some(Color32::from_rgb(0xe7, 0x4c, 0x3c)));
        assert_eq!(photo_fill("data:image/png;base64,AAAA"), None);
    }

    #[test]
    fn test_level_color_thresholds() {
        assert_eq!(level_color(10.0), Color32::from_rgb(231, 76, 60));
        assert_eq!(level_color(30.0), Color32::from_rgb(243, 156, 18));
        assert_eq!(level_color(85.0), Color32::from_rgb(46, 204, 113));
    }
}
