mod overlay;
mod scene_pass;

use glam::{Affine2, Vec2};
use image::RgbaImage;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::config::PresentModeSetting;
use crate::error::{HarnessError, RenderError, Result};
use crate::scene::{Aabb, Alignment, DrawSurface, Fit, RenderResult, compute_alignment};

use overlay::OverlayPass;
use scene_pass::ScenePass;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};

/// `DrawSurface` backed by a wgpu swapchain.
///
/// Drawing only records geometry on the CPU; `flush` acquires the frame,
/// replays every recorded fill as its own draw call, composites the overlay,
/// submits once and presents.
pub struct WgpuSurface {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    scene_pass: ScenePass,
    overlay_pass: OverlayPass,
    overlay_pending: bool,
    transform: Affine2,
    saved: Vec<Affine2>,
    last_draw_calls: usize,
}

impl WgpuSurface {
    /// The window must outlive the returned surface.
    pub async fn new(window: &Window, requested_mode: PresentModeSetting) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            dx12_shader_compiler: Default::default(),
        });
        let surface = unsafe { instance.create_surface(window) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(HarnessError::NoAdapter)?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Primary device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(HarnessError::NoSurfaceFormat)?;
        let present_mode = choose_present_mode(&surface_caps.present_modes, requested_mode);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!(
            "Surface {}x{} {:?}, present mode {:?} (requested {})",
            size.width,
            size.height,
            surface_format,
            present_mode,
            requested_mode.as_str()
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let scene_pass = ScenePass::new(&device, &config);
        let overlay_pass = OverlayPass::new(&device, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            scene_pass,
            overlay_pass,
            overlay_pending: false,
            transform: Affine2::IDENTITY,
            saved: Vec::new(),
            last_draw_calls: 0,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.reconfigure();
    }

    /// Re-applies the current configuration, e.g. after the swapchain was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.scene_pass
            .set_viewport(self.config.width, self.config.height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Draw calls replayed by the most recent successful flush.
    pub fn last_draw_calls(&self) -> usize {
        self.last_draw_calls
    }

    fn end_frame(&mut self) {
        self.scene_pass.reset();
        self.overlay_pending = false;
        self.transform = Affine2::IDENTITY;
        self.saved.clear();
    }
}

impl DrawSurface for WgpuSurface {
    fn bounds(&self) -> Aabb {
        Aabb::from_size(self.config.width as f32, self.config.height as f32)
    }

    fn clear(&mut self) {
        self.scene_pass.reset();
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) -> RenderResult {
        self.transform = self.saved.pop().ok_or(RenderError::UnbalancedRestore)?;
        Ok(())
    }

    fn align(&mut self, fit: Fit, alignment: Alignment, frame: Aabb, content: Aabb) {
        self.transform = self.transform * compute_alignment(fit, alignment, frame, content);
    }

    fn fill(&mut self, vertices: &[Vec2], color: [f32; 4]) -> RenderResult {
        let transform = self.transform;
        let points: Vec<Vec2> = vertices
            .iter()
            .map(|point| transform.transform_point2(*point))
            .collect();
        self.scene_pass.push_polygon(&points, color);
        Ok(())
    }

    fn set_overlay(&mut self, overlay: &RgbaImage) {
        self.overlay_pass
            .upload(&self.queue, overlay, [self.config.width, self.config.height]);
        self.overlay_pending = true;
    }

    fn flush(&mut self) -> RenderResult {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(err) => {
                self.end_frame();
                return Err(err.into());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame encoder"),
            });

        self.scene_pass.upload(&self.device, &self.queue);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            self.scene_pass.record(&mut pass);
        }
        if self.overlay_pending {
            self.overlay_pass.render(&mut encoder, &view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.last_draw_calls = self.scene_pass.draw_count();
        self.end_frame();
        Ok(())
    }
}

fn choose_present_mode(
    available: &[wgpu::PresentMode],
    requested: PresentModeSetting,
) -> wgpu::PresentMode {
    let candidates = match requested {
        PresentModeSetting::Immediate => [
            wgpu::PresentMode::Immediate,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Fifo,
        ],
        PresentModeSetting::Mailbox => [
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
            wgpu::PresentMode::Fifo,
        ],
        PresentModeSetting::VSync => [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ],
    };

    candidates
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_mode_prefers_request_then_falls_back() {
        let all = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];
        assert_eq!(
            choose_present_mode(&all, PresentModeSetting::Immediate),
            wgpu::PresentMode::Immediate
        );
        assert_eq!(
            choose_present_mode(&[wgpu::PresentMode::Fifo], PresentModeSetting::Mailbox),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(
            choose_present_mode(
                &[wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo],
                PresentModeSetting::VSync
            ),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(choose_present_mode(&[], PresentModeSetting::Mailbox), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn screen_corners_map_to_clip_space() {
        assert_eq!(scene_pass::screen_to_ndc(0.0, 0.0, 200.0, 100.0), [-1.0, 1.0]);
        assert_eq!(scene_pass::screen_to_ndc(200.0, 100.0, 200.0, 100.0), [1.0, -1.0]);
        assert_eq!(scene_pass::screen_to_ndc(100.0, 50.0, 200.0, 100.0), [0.0, 0.0]);
    }
}
