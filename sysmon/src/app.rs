//! The desktop dashboard.

use crate::app::{
    config::Config,
    event::{AppEvent, SamplingEvent, UiEvent},
    renderer::Renderer,
    sampling::Sampler,
};
use anyhow::Context;
use std::{sync::Arc, time::Instant};
use sysmon_core::rate::FrameCounter;
use tracing::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

pub mod config;
pub mod event;
pub mod renderer;
pub mod sampling;

/// Owns the window, the renderer and the sampling thread.
#[derive(Debug)]
#[must_use]
pub struct App {
    config: Config,
    event_proxy: EventLoopProxy<AppEvent>,
    renderer: Option<Renderer>,
    sampler: Option<Sampler>,
    frames: FrameCounter,
    occluded: bool,
}

impl App {
    /// Opens the dashboard window and blocks until it is closed.
    ///
    /// # Errors
    ///
    /// If the event loop fails to build or run, then an error is returned.
    pub fn run(config: Config) -> anyhow::Result<()> {
        let event_loop = EventLoop::<AppEvent>::with_user_event()
            .build()
            .context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = Self::new(config, event_loop.create_proxy());
        event_loop
            .run_app(&mut app)
            .context("event loop exited with an error")?;

        Ok(())
    }

    pub fn new(config: Config, event_proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            config,
            event_proxy,
            renderer: None,
            sampler: None,
            frames: FrameCounter::new(Instant::now()),
            occluded: false,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = Config::WINDOW_SIZE;
        let (min_width, min_height) = Config::MIN_WINDOW_SIZE;
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(Config::WINDOW_TITLE)
                    .with_inner_size(LogicalSize::new(width, height))
                    .with_min_inner_size(LogicalSize::new(min_width, min_height)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);

        let renderer = pollster::block_on(Renderer::initialize(
            self.event_proxy.clone(),
            Arc::clone(&window),
            &self.config,
        ))?;
        self.renderer = Some(renderer);
        self.sampler = Some(Sampler::spawn(
            self.event_proxy.clone(),
            &self.config.monitor,
        )?);
        info!(
            "monitoring every {:?}, keeping {} samples",
            self.config.monitor.update_interval, self.config.monitor.history_size
        );
        window.request_redraw();

        Ok(())
    }

    fn on_sampling_event(&mut self, event: SamplingEvent) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        match event {
            SamplingEvent::Sample(mut sample) => {
                sample.fps = frame_rate(&self.frames, self.occluded, Instant::now());
                renderer.gui.on_sample(*sample, &self.config);
                renderer.window().request_redraw();
            }
            SamplingEvent::Processes(processes) => renderer.gui.on_processes(processes),
        }
    }

    fn on_config_changed(&mut self, config: Config) {
        if let Some(sampler) = &self.sampler {
            sampler.apply(&self.config.monitor, &config.monitor);
        }
        if let Some(renderer) = &mut self.renderer {
            if config.renderer.vsync != self.config.renderer.vsync {
                renderer.set_vsync(config.renderer.vsync);
            }
            renderer.gui.on_config_changed(&config);
        }
        debug!("configuration updated: {config:?}");
        self.config = config;
    }

    fn on_error(&mut self, err: anyhow::Error) {
        error!("{err:?}");
        if let Some(renderer) = &mut self.renderer {
            renderer.gui.error = Some(err.to_string());
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut sampler) = self.sampler.take() {
            sampler.stop();
        }
        if let Err(err) = self.config.save() {
            error!("failed to save config: {err:?}");
        }
    }
}

/// The measured render rate, or `None` while nothing is being drawn.
fn frame_rate(frames: &FrameCounter, occluded: bool, now: Instant) -> Option<f32> {
    if occluded {
        return None;
    }
    frames.fps_at(now)
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.initialize(event_loop) {
            error!("failed to initialize: {err:?}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        if renderer.window().id() != window_id {
            return;
        }

        let repaint = renderer.on_window_event(&event);
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                let result = renderer.redraw(&self.config);
                self.frames.tick(Instant::now());
                if !self.occluded {
                    // Continuous redraws keep the measured frame rate meaningful
                    renderer.window().request_redraw();
                }
                if let Err(err) = result {
                    self.on_error(err);
                }
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                if !occluded {
                    renderer.window().request_redraw();
                }
            }
            _ => {
                if repaint {
                    renderer.window().request_redraw();
                }
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Sampling(event) => self.on_sampling_event(event),
            AppEvent::Ui(UiEvent::ConfigChanged(config)) => self.on_config_changed(*config),
            AppEvent::Ui(UiEvent::Terminate) => event_loop.exit(),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
