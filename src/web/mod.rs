//! HTTP surface: JSON API, HTML pages and the cross-cutting layers.

pub mod api;
pub mod cors;
pub mod csrf;
pub mod extract;
pub mod fallback;
pub mod spa;
