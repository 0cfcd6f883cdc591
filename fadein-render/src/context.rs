//! GPU context for presenting the pixmap.
//!
//! Windowed contexts own the surface the desktop host draws into. Headless
//! contexts have no surface and exist so tests and benches can exercise the
//! upload path.

use log::{debug, info};
use thiserror::Error;
use wgpu::{
    Adapter, CompositeAlphaMode, Device, DeviceDescriptor, Instance, PresentMode, Queue,
    RequestAdapterOptions, Surface, SurfaceConfiguration, TextureFormat, TextureUsages,
};

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface error: {0}")]
    Surface(String),
}

pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub adapter_name: String,
    pub surface: Option<Surface<'static>>,
    /// Format the present pipeline renders into.
    pub surface_format: TextureFormat,
    config: Option<SurfaceConfiguration>,
}

impl GpuContext {
    pub async fn new_headless() -> Result<Self, GpuError> {
        let instance = Instance::default();
        let (adapter, device, queue) = open_device(&instance, None, "fadein-headless").await?;
        debug!("headless GPU context on {}", adapter.get_info().name);

        Ok(Self {
            device,
            queue,
            adapter_name: adapter.get_info().name,
            surface: None,
            surface_format: TextureFormat::Bgra8UnormSrgb,
            config: None,
        })
    }

    /// `window` must outlive the context; an `Arc<winit::window::Window>`
    /// does.
    pub async fn new_with_surface<W>(window: W, width: u32, height: u32) -> Result<Self, GpuError>
    where
        W: wgpu::WasmNotSendSync + Into<wgpu::SurfaceTarget<'static>>,
    {
        let instance = Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| GpuError::Surface(e.to_string()))?;
        let (adapter, device, queue) =
            open_device(&instance, Some(&surface), "fadein-windowed").await?;

        let config = surface_config(&surface, &adapter, width, height)?;
        surface.configure(&device, &config);
        let adapter_name = adapter.get_info().name;
        info!(
            "GPU surface {}x{} {:?} on {adapter_name}",
            config.width, config.height, config.format
        );

        Ok(Self {
            device,
            queue,
            adapter_name,
            surface_format: config.format,
            surface: Some(surface),
            config: Some(config),
        })
    }

    /// Resize the surface. Ignored when headless or for a zero dimension.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(config) = self.config.as_mut() {
            config.width = width;
            config.height = height;
        }
        self.reconfigure();
    }

    /// Re-apply the surface configuration, e.g. after `SurfaceError::Lost`.
    pub fn reconfigure(&self) {
        if let (Some(surface), Some(config)) = (&self.surface, &self.config) {
            surface.configure(&self.device, config);
        }
    }

    /// `(0, 0)` when headless.
    pub fn surface_size(&self) -> (u32, u32) {
        self.config.as_ref().map_or((0, 0), |c| (c.width, c.height))
    }
}

/// A low-power adapter (compatible with `surface` when given) and its device.
async fn open_device(
    instance: &Instance,
    surface: Option<&Surface<'static>>,
    label: &str,
) -> Result<(Adapter, Device, Queue), GpuError> {
    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;
    let descriptor = DeviceDescriptor {
        label: Some(label),
        ..Default::default()
    };
    let (device, queue) = adapter.request_device(&descriptor, None).await?;
    Ok((adapter, device, queue))
}

/// FIFO configuration in the first sRGB format the surface offers.
fn surface_config(
    surface: &Surface<'static>,
    adapter: &Adapter,
    width: u32,
    height: u32,
) -> Result<SurfaceConfiguration, GpuError> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(TextureFormat::is_srgb)
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| GpuError::Surface("surface reports no formats".into()))?;

    Ok(SurfaceConfiguration {
        usage: TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: PresentMode::Fifo,
        desired_maximum_frame_latency: 2,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(CompositeAlphaMode::Auto),
        view_formats: Vec::new(),
    })
}
