//! Side-scrolling platformer: main loop and application entry point.
//!
//! winit drives the event loop through `ApplicationHandler`. Each redraw is
//! one frame:
//!
//!   1. measure the capped wall-clock delta (see `TimeState`)
//!   2. read the keyboard into a `PlayerInput` and tick the game once
//!   3. hand raised audio cues to the cue player
//!   4. centre the camera on the player and rebuild the sprite mesh
//!   5. draw sprites, then the egui HUD on top
//!
//! After the player touches an enemy the game stops ticking; the frozen frame
//! stays up with a banner for `GAME_OVER_LINGER_MS`, then the loop exits.
//!
//! Redraws are paced to `settings::FRAMERATE` with `ControlFlow::WaitUntil`.
//! Level and images load before the window opens so a broken asset fails
//! fast with a readable error.

mod assets;
mod audio;
mod collision;
mod enemy;
mod entity;
mod events;
mod game;
mod level;
mod mask;
mod mesh;
mod player;
mod projectile;
mod rect;
#[cfg(test)]
mod replay;
mod settings;
mod world;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::GameAssets;
use audio::CuePlayer;
use game::Game;
use level::load_level_from_path;
use mesh::{build_scene_mesh, count_texture_binds, DrawCall, TextureKey};
use pf_core::input::{InputState, Key};
use pf_core::time::TimeState;
use pf_overlay::{HudState, Overlay, OverlayStats};
use pf_platform::window::PlatformConfig;
use pf_render::{Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture};
use player::PlayerInput;
use rect::FRect;

const MOVE_LEFT_KEYS: &[Key] = &[Key::Left, Key::A, Key::Q];
const MOVE_RIGHT_KEYS: &[Key] = &[Key::Right, Key::D];
const JUMP_KEYS: &[Key] = &[Key::Space, Key::Up, Key::W];
const FIRE_KEYS: &[Key] = &[Key::S, Key::X, Key::Down];

struct GpuSpriteTexture {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Everything loaded from disk before the window exists.
struct LoadedContent {
    game: Game,
    cue_player: CuePlayer,
}

/// All mutable engine state. Constructed in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    overlay: Overlay,

    game: Game,
    cue_player: CuePlayer,
    game_over_at: Option<Instant>,
    show_collision_debug: bool,
    textures: HashMap<TextureKey, GpuSpriteTexture>,

    // The sprite mesh is rebuilt on the CPU each frame and streamed into
    // these buffers. Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
}

impl EngineState {
    fn new(window: Arc<Window>, content: LoadedContent) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let overlay = Overlay::new(&gpu.device, gpu.surface_format, &window);
        let mut camera = Camera2D::new(gpu.size.0, gpu.size.1);
        if let Some(player) = content.game.player_snapshot() {
            camera.follow(player.rect.center());
        }

        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let mut textures = HashMap::new();
        for (id, image) in content.game.images().iter() {
            let label = format!("Sprite Texture {}", id.index());
            let texture = Texture::from_image(&gpu.device, &gpu.queue, image, &label);
            let bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &texture);
            textures.insert(
                TextureKey::Image(id),
                GpuSpriteTexture {
                    texture,
                    bind_group,
                },
            );
        }
        let white = Texture::solid(&gpu.device, &gpu.queue, [255; 4], "Debug White");
        let bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &white);
        textures.insert(
            TextureKey::DebugWhite,
            GpuSpriteTexture {
                texture: white,
                bind_group,
            },
        );
        log::info!("Uploaded {} textures", textures.len());

        let mesh_vertex_capacity = 1024;
        let mesh_index_capacity = 1536;
        let vertex_buffer = create_vertex_buffer(&gpu.device, mesh_vertex_capacity);
        let index_buffer = create_index_buffer(&gpu.device, mesh_index_capacity);

        Ok(Self {
            window,
            gpu,
            time: TimeState::new(settings::FRAMERATE),
            input: InputState::new(),
            camera,
            sprite_pipeline,
            overlay,
            game: content.game,
            cue_player: content.cue_player,
            game_over_at: None,
            show_collision_debug: false,
            textures,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity,
            mesh_index_capacity,
            draw_calls: Vec::new(),
        })
    }

    fn player_input(&self) -> PlayerInput {
        PlayerInput {
            move_x: self.input.axis(MOVE_LEFT_KEYS, MOVE_RIGHT_KEYS),
            jump_pressed: self.input.any_just_pressed(JUMP_KEYS),
            fire_held: self.input.any_held(FIRE_KEYS),
        }
    }

    fn toggle_collision_debug(&mut self) {
        self.show_collision_debug = !self.show_collision_debug;
        log::info!(
            "Collision debug: {}",
            if self.show_collision_debug {
                "ON"
            } else {
                "OFF"
            }
        );
    }

    /// One simulation tick plus its side effects outside the game.
    fn update(&mut self) {
        let input = self.player_input();
        self.game.tick(self.time.dt_secs(), input);
        for cue in self.game.drain_cues() {
            self.cue_player.play(cue);
        }
        if let Some(player) = self.game.player_snapshot() {
            self.camera.follow(player.rect.center());
        }
    }

    /// True once the game-over frame has been on screen long enough.
    fn game_over_elapsed(&mut self) -> bool {
        if self.game.is_running() {
            return false;
        }
        let since = *self.game_over_at.get_or_insert_with(|| {
            log::info!("Game over, final score {}", self.game.score());
            Instant::now()
        });
        since.elapsed() >= Duration::from_millis(settings::GAME_OVER_LINGER_MS)
    }

    fn view_rect(&self) -> FRect {
        let offset = self.camera.offset();
        FRect::new(
            offset.x,
            offset.y,
            self.camera.viewport.0 as f32 / self.camera.zoom,
            self.camera.viewport.1 as f32 / self.camera.zoom,
        )
    }

    fn rebuild_scene_mesh(&mut self) {
        let mesh = build_scene_mesh(&self.game, &self.view_rect(), self.show_collision_debug);
        self.ensure_mesh_capacity(mesh.vertices.len(), mesh.indices.len());
        if !mesh.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&mesh.vertices),
            );
        }
        if !mesh.indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        }
        self.draw_calls = mesh.draw_calls;
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn overlay_stats(&self) -> OverlayStats {
        let stats = self.game.stats();
        let player = self.game.player();
        OverlayStats {
            entities: stats.entities as u32,
            enemies: stats.enemies as u32,
            bullets: stats.bullets as u32,
            gifts: stats.gifts as u32,
            draw_calls: self.draw_calls.len() as u32,
            player_on_floor: player.is_some_and(|p| p.on_floor),
            player_position: player.map_or((0.0, 0.0), |p| (p.hitbox.x, p.hitbox.y)),
        }
    }

    fn render(&mut self) {
        let camera_uniform = self.camera.build_uniform();
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let hud = HudState {
            score: self.game.score(),
            score_target: settings::SCORE_TARGET,
            game_over: !self.game.is_running(),
        };
        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) = self.overlay.prepare(
            &self.window,
            &self.time,
            hud,
            &stats,
            self.show_collision_debug,
        );
        if overlay_actions.toggle_collision_debug {
            self.toggle_collision_debug();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut last_bound: Option<TextureKey> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for draw in &self.draw_calls {
                let Some(texture) = self.textures.get(&draw.texture) else {
                    continue;
                };
                if last_bound != Some(draw.texture) {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound = Some(draw.texture);
                }
                render_pass.draw_indexed(
                    draw.index_start..(draw.index_start + draw.index_count),
                    0,
                    0..1,
                );
            }
        }

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if self.time.frame_count % 600 == 0 {
            log::debug!(
                "frame {}: {} draw calls, {} binds",
                self.time.frame_count,
                self.draw_calls.len(),
                count_texture_binds(&self.draw_calls)
            );
        }
    }
}

struct App {
    config: PlatformConfig,
    content: Option<LoadedContent>,
    state: Option<EngineState>,
}

impl App {
    fn new(content: LoadedContent) -> Self {
        Self {
            config: PlatformConfig {
                title: settings::WINDOW_TITLE.to_string(),
                width: settings::WINDOW_WIDTH,
                height: settings::WINDOW_HEIGHT,
            },
            content: Some(content),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(content) = self.content.take() else {
            return;
        };
        let window = match pf_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        match EngineState::new(window, content) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Failed to initialise renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };
        let deadline = state.time.next_frame_deadline();
        if Instant::now() >= deadline {
            state.window.request_redraw();
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();

                if state.input.is_just_pressed(Key::Escape) {
                    log::info!("Escape pressed, exiting.");
                    event_loop.exit();
                    return;
                }
                if state.input.is_just_pressed(Key::F3) {
                    state.overlay.toggle_debug();
                }
                if state.input.is_just_pressed(Key::F4) {
                    state.toggle_collision_debug();
                }

                state.update();
                state.rebuild_scene_mesh();
                state.render();

                state.input.end_frame();

                if state.game_over_elapsed() {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Background colour in linear space for the sRGB surface.
fn clear_color() -> wgpu::Color {
    let [r, g, b] = settings::BG_COLOR.map(srgb_to_linear);
    wgpu::Color { r, g, b, a: 1.0 }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyX => Some(Key::X),
        _ => None,
    }
}

fn load_content() -> Result<LoadedContent, String> {
    let level = load_level_from_path(Path::new(settings::LEVEL_PATH))?;
    let root = Path::new(settings::ASSET_ROOT);
    let assets = GameAssets::load(root, &level)?;
    let game = Game::new(&level, assets, StdRng::from_entropy())?;
    let cue_player = CuePlayer::load(root, settings::AUDIO_DIR);
    Ok(LoadedContent { game, cue_player })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Platformer starting...");

    let content = match load_content() {
        Ok(content) => content,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(content);
    event_loop.run_app(&mut app).expect("Event loop error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints_map_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-9);
        // Mid grey is darker in linear space.
        assert!(srgb_to_linear(128) < 0.25);
    }

    #[test]
    fn movement_and_fire_keys_are_mapped() {
        for key in MOVE_LEFT_KEYS
            .iter()
            .chain(MOVE_RIGHT_KEYS)
            .chain(JUMP_KEYS)
            .chain(FIRE_KEYS)
        {
            let mapped = [
                KeyCode::ArrowLeft,
                KeyCode::ArrowRight,
                KeyCode::ArrowUp,
                KeyCode::ArrowDown,
                KeyCode::Space,
                KeyCode::KeyW,
                KeyCode::KeyA,
                KeyCode::KeyS,
                KeyCode::KeyD,
                KeyCode::KeyQ,
                KeyCode::KeyX,
            ]
            .into_iter()
            .filter_map(map_key)
            .any(|k| k == *key);
            assert!(mapped, "{key:?} has no physical key");
        }
    }
}
