//! egui layer drawn over the game scene: the score HUD, the game-over banner
//! and the F3 debug window.
//!
//! egui needs a three-phase render split because `egui_wgpu::Renderer::render()`
//! wants a `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers
//!   3. `paint()`   -- render into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references

use egui::{Align2, Color32, RichText};
use pf_core::time::TimeState;
use winit::window::Window;

/// Gameplay values the HUD shows every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudState {
    pub score: u32,
    /// Display-only target shown as `score/target`.
    pub score_target: u32,
    pub game_over: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub entities: u32,
    pub enemies: u32,
    pub bullets: u32,
    pub gifts: u32,
    pub draw_calls: u32,
    pub player_on_floor: bool,
    pub player_position: (f32, f32),
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    /// User flipped the collision debug checkbox.
    pub toggle_collision_debug: bool,
}

pub struct Overlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl Overlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        hud: HudState,
        stats: &OverlayStats,
        collision_debug: bool,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Area::new(egui::Id::new("hud_score"))
                .anchor(Align2::LEFT_TOP, egui::vec2(24.0, 16.0))
                .interactable(false)
                .show(ctx, |ui| {
                    ui.label(
                        RichText::new(format!("Score: {}/{}", hud.score, hud.score_target))
                            .size(32.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                });

            if hud.game_over {
                egui::Area::new(egui::Id::new("hud_game_over"))
                    .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                    .interactable(false)
                    .show(ctx, |ui| {
                        ui.label(
                            RichText::new("GAME OVER")
                                .size(64.0)
                                .strong()
                                .color(Color32::from_rgb(240, 80, 80)),
                        );
                    });
            }

            if self.debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 80.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                        ui.label(format!("Frame: {}", time.frame_count));
                        ui.separator();
                        ui.label(format!("Entities: {}", stats.entities));
                        ui.label(format!("Enemies: {}", stats.enemies));
                        ui.label(format!("Bullets: {}", stats.bullets));
                        ui.label(format!("Gifts left: {}", stats.gifts));
                        ui.label(format!("Draw calls: {}", stats.draw_calls));
                        ui.separator();
                        ui.label(format!(
                            "Player: ({:.0}, {:.0}) {}",
                            stats.player_position.0,
                            stats.player_position.1,
                            if stats.player_on_floor {
                                "grounded"
                            } else {
                                "airborne"
                            }
                        ));
                        let mut show = collision_debug;
                        if ui.checkbox(&mut show, "Collision debug (F4)").changed() {
                            actions.toggle_collision_debug = true;
                        }
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
