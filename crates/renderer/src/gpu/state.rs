use std::sync::Arc;

use anyhow::Result;
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::color::clear_color;
use crate::types::GpuOptions;
use crate::uniforms::WaveUniforms;
use crate::wave::{FrameError, WaveSurface};

use super::context::GpuContext;
use super::pipeline::WavePipeline;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    fn for_context(context: &GpuContext) -> Option<Self> {
        (context.sample_count > 1).then(|| {
            Self::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }
}

/// `wgpu` backend for [`crate::WaveRenderer`], drawing into a `winit` window.
pub struct GpuState {
    pipeline: Option<WavePipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    multisample_target: Option<MultisampleTarget>,
    context: GpuContext,
    // Declared last: the surface holds raw handles into this window.
    window: Arc<Window>,
}

impl GpuState {
    pub fn new(window: Arc<Window>, options: GpuOptions) -> Result<Self> {
        let context = GpuContext::new(window.as_ref(), window.inner_size(), options.antialiasing)?;
        let pipeline =
            WavePipeline::new(&context.device, context.surface_format, context.sample_count)?;

        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("wave uniforms"),
                contents: bytemuck::bytes_of(&WaveUniforms::new(
                    context.size.width,
                    context.size.height,
                    crate::types::ColorMode::default().wave_color(),
                )),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("wave uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        let multisample_target = MultisampleTarget::for_context(&context);

        Ok(Self {
            pipeline: Some(pipeline),
            uniform_buffer,
            uniform_bind_group,
            multisample_target,
            context,
            window,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn sample_count(&self) -> u32 {
        self.context.sample_count
    }

    fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, FrameError> {
        match self.context.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                Err(FrameError::Outdated)
            }
            Err(wgpu::SurfaceError::Timeout) => Err(FrameError::Timeout),
            Err(other) => Err(FrameError::Fatal(other.to_string())),
        }
    }
}

impl WaveSurface for GpuState {
    fn viewport_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn configure(&mut self, width: u32, height: u32) {
        self.context.resize(PhysicalSize::new(width, height));
        self.multisample_target = MultisampleTarget::for_context(&self.context);
        debug!(width, height, "reconfigured wave surface");
    }

    fn draw(&mut self, uniforms: &WaveUniforms) -> Result<(), FrameError> {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return Ok(());
        };
        let frame = self.acquire_frame()?;

        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("wave encoder"),
            });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("wave pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, pipeline.quad.slice(..));
            render_pass.draw(0..4, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
        Ok(())
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }

    fn release(&mut self) {
        self.pipeline = None;
        self.multisample_target = None;
        self.context.device.destroy();
        debug!("released wave pipeline and GPU device");
    }
}
