//! The environment a sky is mounted into: viewport size, a refresh-synced
//! frame callback, resize notifications and somewhere to put pixels.

use crate::canvas::Surface;
use crate::error::SkyResult;

pub mod terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Frame(FrameRequest),
    Resize(ListenerId),
}

/// A host emits `Frame` only for an outstanding request and `Resize` only
/// for a registered listener.
pub trait Host {
    fn viewport(&self) -> (u32, u32);

    fn has_drawing_context(&self) -> bool {
        true
    }

    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
    fn add_resize_listener(&mut self) -> ListenerId;
    fn remove_resize_listener(&mut self, id: ListenerId);
    fn present(&mut self, surface: &Surface) -> SkyResult<()>;
}
