pub mod overlay;

pub use overlay::{HudState, Overlay, OverlayActions, OverlayStats};
