use crate::app::{config::Config, event::AppEvent, renderer::gui::Gui};
use anyhow::Context;
use egui::{ClippedPrimitive, TexturesDelta};
use std::sync::Arc;
use tracing::{debug, info, warn};
use winit::{event::WindowEvent, event_loop::EventLoopProxy, window::Window};

pub mod chart;
pub mod gui;
pub mod theme;

const fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[must_use]
pub struct Renderer {
    window: Arc<Window>,
    pub gui: Gui,
    ctx: egui::Context,
    egui_state: egui_winit::State,
    screen_descriptor: egui_wgpu::ScreenDescriptor,
    renderer: egui_wgpu::Renderer,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    resize_surface: bool,
    paint_jobs: Vec<ClippedPrimitive>,
    textures: TexturesDelta,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("gui", &self.gui)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Sets up the GPU surface and egui state for `window`.
    pub async fn initialize(
        event_proxy: EventLoopProxy<AppEvent>,
        window: Arc<Window>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let window_size = window.inner_size();
        let scale_factor = window.scale_factor() as f32;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to request wgpu adapter")?;
        info!("using graphics adapter: {:?}", adapter.get_info().name);

        let mut required_limits = wgpu::Limits::downlevel_defaults();
        // Allow the window to be maximized on large displays
        required_limits.max_texture_dimension_2d = adapter.limits().max_texture_dimension_2d;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("sysmon"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .context("failed to request wgpu device")?;

        let max_texture_dimension = device.limits().max_texture_dimension_2d;
        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("surface is incompatible with the graphics adapter")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: window_size.width.clamp(1, max_texture_dimension),
            height: window_size.height.clamp(1, max_texture_dimension),
            present_mode: present_mode(config.renderer.vsync),
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);
        debug!("surface configured: {surface_config:?}");

        let ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            ctx.clone(),
            ctx.viewport_id(),
            &*window,
            Some(scale_factor),
            window.theme(),
            Some(max_texture_dimension as usize),
        );
        let renderer = egui_wgpu::Renderer::new(&device, surface_config.format, None, 1, false);

        Ok(Self {
            window,
            gui: Gui::new(event_proxy, config),
            ctx,
            egui_state,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [surface_config.width, surface_config.height],
                pixels_per_point: scale_factor,
            },
            renderer,
            surface,
            device,
            queue,
            surface_config,
            resize_surface: false,
            paint_jobs: vec![],
            textures: TexturesDelta::default(),
        })
    }

    pub const fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Handle window event. Returns whether a repaint is needed.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(&self.window, event);
        match event {
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    let max_texture_dimension = self.device.limits().max_texture_dimension_2d;
                    let width = size.width.min(max_texture_dimension);
                    let height = size.height.min(max_texture_dimension);
                    self.screen_descriptor.size_in_pixels = [width, height];
                    self.surface_config.width = width;
                    self.surface_config.height = height;
                    self.resize_surface = true;
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.screen_descriptor.pixels_per_point = *scale_factor as f32;
            }
            _ => (),
        }
        response.repaint
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.surface_config.present_mode = present_mode(enabled);
        self.resize_surface = true;
    }

    fn prepare(&mut self, config: &Config) {
        let raw_input = self.egui_state.take_egui_input(&self.window);

        let output = self.ctx.run(raw_input, |ctx| {
            self.gui.ui(ctx, config);
        });

        self.screen_descriptor.pixels_per_point = output.pixels_per_point;
        self.textures.append(output.textures_delta);
        self.egui_state
            .handle_platform_output(&self.window, output.platform_output);
        self.paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
    }

    /// Lays out the dashboard and presents a frame.
    pub fn redraw(&mut self, config: &Config) -> anyhow::Result<()> {
        self.prepare(config);

        if self.resize_surface {
            self.surface.configure(&self.device, &self.surface_config);
            self.resize_surface = false;
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(_) => {
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .context("failed to acquire surface texture")?
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("dashboard"),
            ..Default::default()
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer"),
            });
        for (id, image_delta) in &self.textures.set {
            self.renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let commands = self.renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.paint_jobs,
            &self.screen_descriptor,
        );

        let [r, g, b, _] = self.gui.theme.palette().background.to_normalized_gamma_f32();
        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("dashboard"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: f64::from(r),
                                g: f64::from(g),
                                b: f64::from(b),
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut render_pass, &self.paint_jobs, &self.screen_descriptor);
        }

        // Cleanup
        let textures = std::mem::take(&mut self.textures);
        for id in &textures.free {
            self.renderer.free_texture(id);
        }

        self.queue
            .submit(commands.into_iter().chain(Some(encoder.finish())));
        self.window.pre_present_notify();
        frame.present();

        Ok(())
    }
}
