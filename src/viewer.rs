//! Window and event loop.
//!
//! The scene is imported before the event loop starts. Once winit hands us a
//! window the GPU context is created, textures are loaded through a
//! [`GpuTextureFactory`] and the flattened model is uploaded. Every redraw
//! advances the orbit camera and draws the model.

use std::{iter, sync::Arc};

use anyhow::Context as _;
use instant::Instant;
use tokio::runtime::Runtime;
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    camera::{CameraUniform, OrbitCamera},
    config::ViewerConfig,
    context::Context,
    data_structures::{scene_graph::SourceScene, texture::GpuTextureFactory},
    pipelines::Pipelines,
    render::GpuModel,
    resources,
};

struct ViewerState {
    ctx: Context,
    pipelines: Pipelines,
    model: GpuModel,
    camera: OrbitCamera,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    clear_colour: wgpu::Color,
    started: Instant,
}

impl ViewerState {
    async fn new(
        window: Arc<Window>,
        config: &ViewerConfig,
        scene: &SourceScene,
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let pipelines = Pipelines::new(&ctx.device, &ctx.config);

        let mut factory = GpuTextureFactory::new(&ctx.device, &ctx.queue);
        let model = resources::load_model(scene, &config.texture_dirs, &mut factory)?;
        let textures = factory.finish();
        log::info!("{} textures uploaded", textures.len());
        let model = GpuModel::new(&ctx.device, &ctx.queue, &pipelines, &model, textures);

        let camera = OrbitCamera::new(config.camera, ctx.config.width, ctx.config.height);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update(&camera, 0.0);
        let camera_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipelines.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Ok(Self {
            ctx,
            pipelines,
            model,
            camera,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            clear_colour: config.clear_colour,
            started: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.camera.resize(width, height);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        self.ctx.window.request_redraw();

        let seconds = self.started.elapsed().as_secs_f32();
        self.camera_uniform.update(&self.camera, seconds);
        self.ctx.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                multiview_mask: None,
                timestamp_writes: None,
            });

            self.model
                .draw(&mut render_pass, &self.pipelines, &self.camera_bind_group);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct Viewer {
    async_runtime: Runtime,
    config: ViewerConfig,
    scene: SourceScene,
    state: Option<ViewerState>,
    error: Option<anyhow::Error>,
}

impl Viewer {
    fn init(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<ViewerState> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create the viewer window")?,
        );
        self.async_runtime
            .block_on(ViewerState::new(window, &self.config, &self.scene))
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.ctx.window().request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Viewer setup failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                    let size = state.ctx.window().inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {:?}", e);
                }
            },
            _ => {}
        }
    }
}

/// Open a window and orbit around `scene` until it is closed.
pub fn run(config: ViewerConfig, scene: SourceScene) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let async_runtime = Runtime::new().context("failed to start the async runtime")?;
    let mut app = Viewer {
        async_runtime,
        config,
        scene,
        state: None,
        error: None,
    };

    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
