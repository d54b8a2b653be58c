//! Error types for maskflow.
//!
//! This module provides error types for GPU initialization, mask image
//! loading, and sketch construction. The mask image is required to build the
//! flow field before any particle exists, so decode failures are fatal and
//! propagate to the caller; there is no retry path.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading the mask image.
#[derive(Debug)]
pub enum MaskError {
    /// Failed to decode the image file.
    ImageLoad(image::ImageError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// The decoded image has a zero dimension.
    EmptyImage,
}

impl fmt::Display for MaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskError::ImageLoad(e) => write!(f, "Failed to decode mask image: {}", e),
            MaskError::Io(e) => write!(f, "Failed to read mask file: {}", e),
            MaskError::EmptyImage => write!(f, "Mask image has a zero width or height"),
        }
    }
}

impl std::error::Error for MaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MaskError::ImageLoad(e) => Some(e),
            MaskError::Io(e) => Some(e),
            MaskError::EmptyImage => None,
        }
    }
}

impl From<image::ImageError> for MaskError {
    fn from(e: image::ImageError) -> Self {
        MaskError::ImageLoad(e)
    }
}

impl From<std::io::Error> for MaskError {
    fn from(e: std::io::Error) -> Self {
        MaskError::Io(e)
    }
}

/// Errors that can occur when building or running a sketch.
#[derive(Debug)]
pub enum SketchError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Mask image loading failed.
    Mask(MaskError),
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SketchError::Window(e) => write!(f, "Failed to create window: {}", e),
            SketchError::Gpu(e) => write!(f, "GPU error: {}", e),
            SketchError::Mask(e) => write!(f, "Mask error: {}", e),
        }
    }
}

impl std::error::Error for SketchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SketchError::EventLoop(e) => Some(e),
            SketchError::Window(e) => Some(e),
            SketchError::Gpu(e) => Some(e),
            SketchError::Mask(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for SketchError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SketchError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SketchError {
    fn from(e: winit::error::OsError) -> Self {
        SketchError::Window(e)
    }
}

impl From<GpuError> for SketchError {
    fn from(e: GpuError) -> Self {
        SketchError::Gpu(e)
    }
}

impl From<MaskError> for SketchError {
    fn from(e: MaskError) -> Self {
        SketchError::Mask(e)
    }
}
