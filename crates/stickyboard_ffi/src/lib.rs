//! Flutter-facing bridge over `stickyboard_core`.

pub mod api;
