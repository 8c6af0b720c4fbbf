use egui::Context;

use crate::controller::DemoMode;

/// Snapshot of the state the overlay displays, so both front ends can call
/// the same draw code without sharing ownership of the driver.
pub struct UiData {
    pub eye: glam::Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub mode: DemoMode,
    pub intensity: f32,
    pub pointer_locked: bool,
    pub fps: f32,
    /// Read-write: the settings window edits this and the caller writes it
    /// back to the camera.
    pub fov_deg: f32,
}

/// Build the complete UI from a prepared raw input (WASM path; native goes
/// through egui-winit and calls `draw_ui` directly)
pub fn build_ui(
    egui_ctx: &Context,
    data: &mut UiData,
    canvas_width: u32,
    canvas_height: u32,
    now_ms: f64,
) -> egui::FullOutput {
    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(now_ms / 1000.0);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(canvas_width as f32, canvas_height as f32),
    ));

    egui_ctx.run(raw_input, |ctx| draw_ui(ctx, data))
}

pub fn draw_ui(ctx: &Context, data: &mut UiData) {
    draw_crosshair(ctx);
    draw_instructions(ctx, data);
    draw_debug_window(ctx, data);
    draw_settings_window(ctx, data);
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::TOP,
        egui::Id::new("crosshair"),
    ));
    let center = ctx.available_rect().center();
    let size = 12.0;
    let stroke = egui::Stroke::new(2.0, egui::Color32::RED);
    painter.line_segment(
        [
            egui::Pos2::new(center.x - size, center.y),
            egui::Pos2::new(center.x + size, center.y),
        ],
        stroke,
    );
    painter.line_segment(
        [
            egui::Pos2::new(center.x, center.y - size),
            egui::Pos2::new(center.x, center.y + size),
        ],
        stroke,
    );
    painter.circle_filled(center, 2.0, egui::Color32::RED);
}

fn draw_instructions(ctx: &Context, data: &UiData) {
    egui::Window::new("Drunk FPS Controls")
        .default_pos([20.0, 20.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Click to lock the mouse").small());
            ui.label(egui::RichText::new("Move the mouse to look around").small());
            ui.label(egui::RichText::new("WASD to stumble around").small());
            ui.label(egui::RichText::new("Esc to unlock").small());
            if !data.pointer_locked {
                ui.separator();
                ui.label(
                    egui::RichText::new("pointer not locked")
                        .small()
                        .color(egui::Color32::YELLOW),
                );
            }
        });
}

fn draw_debug_window(ctx: &Context, data: &UiData) {
    egui::Window::new("Debug")
        .default_pos([20.0, 160.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", data.fps)).small());
            ui.label(
                egui::RichText::new(format!(
                    "Pos: x: {:.2} y: {:.2} z: {:.2}",
                    data.eye.x, data.eye.y, data.eye.z
                ))
                .small(),
            );
            ui.label(
                egui::RichText::new(format!(
                    "Yaw: {:.1} Pitch: {:.1} Roll: {:.2}",
                    data.yaw.to_degrees(),
                    data.pitch.to_degrees(),
                    data.roll.to_degrees()
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Mode: {:?}", data.mode)).small());
            if data.mode == DemoMode::Drunk {
                ui.label(egui::RichText::new(format!("Intensity: {:.2}", data.intensity)).small());
            }
        });
}

fn draw_settings_window(ctx: &Context, data: &mut UiData) {
    egui::Window::new("Settings")
        .default_pos([20.0, 320.0])
        .default_size([130.0, 60.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("FOV").small());
            ui.add(egui::Slider::new(&mut data.fov_deg, 30.0..=120.0).step_by(5.0));
        });
}
