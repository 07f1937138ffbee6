//! Procedural night sky renderer: a seeded Milky Way band, nebula washes and
//! twinkling star populations painted onto a software surface, mounted into
//! a host that supplies frames, resizes and somewhere to present pixels.

pub mod canvas;
pub mod config;
pub mod effects;
pub mod error;
pub mod host;
pub mod layer;
