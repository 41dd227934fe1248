//! UI module root: exposes drawing functions for individual panels.

pub mod alerts;
pub mod header;
pub mod net;
pub mod processes;
pub mod theme;
pub mod util;
