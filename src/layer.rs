//! Mount/run/unmount lifecycle of a sky effect inside a host: the frame
//! loop and keeping the surface the size of the viewport.

use tracing::{debug, info, trace, warn};

use crate::canvas::Surface;
use crate::effects::Effect;
use crate::error::SkyResult;
use crate::host::{FrameRequest, Host, HostEvent, ListenerId};

/// The two resources a running layer holds on its host. `stop` consumes
/// the handle, so they are released exactly once.
#[derive(Debug)]
pub struct RenderHandle {
    frame: Option<FrameRequest>,
    listener: ListenerId,
}

impl RenderHandle {
    pub fn stop<H: Host + ?Sized>(self, host: &mut H) {
        if let Some(request) = self.frame {
            host.cancel_frame(request);
        }
        host.remove_resize_listener(self.listener);
    }
}

pub struct Running<E> {
    effect: E,
    surface: Surface,
    handle: RenderHandle,
}

pub enum SkyLayer<E> {
    /// The host had nothing to draw on; every event is ignored.
    Inert,
    Running(Running<E>),
}

fn fit_to_viewport<H: Host + ?Sized>(surface: &mut Surface, host: &H) {
    let (width, height) = host.viewport();
    surface.resize(width, height);
}

impl<E: Effect> SkyLayer<E> {
    /// Builds the effect, sizes the surface, registers for resizes and
    /// requests the first frame. `make` only runs when the host can draw.
    pub fn mount<H, F>(host: &mut H, make: F) -> Self
    where
        H: Host + ?Sized,
        F: FnOnce() -> E,
    {
        if !host.has_drawing_context() {
            warn!("host has no drawing context, sky layer disabled");
            return SkyLayer::Inert;
        }

        let effect = make();
        let mut surface = Surface::new(0, 0);
        fit_to_viewport(&mut surface, &*host);
        let listener = host.add_resize_listener();
        let frame = Some(host.request_frame());
        info!(width = surface.width(), height = surface.height(), "sky layer mounted");

        SkyLayer::Running(Running {
            effect,
            surface,
            handle: RenderHandle { frame, listener },
        })
    }

    pub fn handle<H: Host + ?Sized>(&mut self, host: &mut H, event: HostEvent) -> SkyResult<()> {
        let SkyLayer::Running(running) = self else {
            return Ok(());
        };

        match event {
            HostEvent::Frame(request) if running.handle.frame == Some(request) => {
                running.handle.frame = None;
                running.surface.clear();
                running.effect.render(&mut running.surface);
                running.effect.update();
                host.present(&running.surface)?;
                running.handle.frame = Some(host.request_frame());
            }
            HostEvent::Resize(id) if id == running.handle.listener => {
                fit_to_viewport(&mut running.surface, &*host);
                debug!(
                    width = running.surface.width(),
                    height = running.surface.height(),
                    "surface resized"
                );
            }
            stale => trace!(?stale, "ignoring event for another subscriber"),
        }
        Ok(())
    }

    pub fn unmount<H: Host + ?Sized>(self, host: &mut H) {
        if let SkyLayer::Running(running) = self {
            running.handle.stop(host);
            info!("sky layer unmounted");
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        matches!(self, SkyLayer::Running(_))
    }

    #[cfg(test)]
    pub(crate) fn surface(&self) -> Option<&Surface> {
        match self {
            SkyLayer::Running(running) => Some(&running.surface),
            SkyLayer::Inert => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn effect(&self) -> Option<&E> {
        match self {
            SkyLayer::Running(running) => Some(&running.effect),
            SkyLayer::Inert => None,
        }
    }
}
