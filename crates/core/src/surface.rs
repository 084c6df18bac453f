// Render surface handle and the lifecycle events of the surface adapter

/// Opaque handle to a platform drawable surface (a `SurfaceTexture` or
/// `ANativeWindow` on Android). The core never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Events reported by the render-surface adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A drawable surface exists and can be bound to a decoder
    Available {
        handle: SurfaceHandle,
        width: u32,
        height: u32,
    },
    /// Surface size changed
    SizeChanged { width: u32, height: u32 },
    /// Surface is going away
    Destroyed,
    /// A frame was presented
    Updated,
}

/// The view that presents decoded frames.
///
/// Platform glue implements this; the player only rebinds the handle and
/// forwards the decoded video size so the view can fix its aspect ratio.
pub trait RenderSurface {
    /// Bind a (possibly recreated) surface handle to the view
    fn set_surface_handle(&mut self, handle: SurfaceHandle);

    /// Decoded video size changed
    fn resize_video(&mut self, width: u32, height: u32);
}

/// Last surface handle and size seen by the player, used to hand the surface
/// to a replacement kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceBinding {
    pub handle: Option<SurfaceHandle>,
    pub width: u32,
    pub height: u32,
}

impl SurfaceBinding {
    pub fn apply(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Available {
                handle,
                width,
                height,
            } => {
                self.handle = Some(handle);
                self.width = width;
                self.height = height;
            }
            SurfaceEvent::SizeChanged { width, height } => {
                self.width = width;
                self.height = height;
            }
            SurfaceEvent::Destroyed | SurfaceEvent::Updated => {}
        }
    }
}
