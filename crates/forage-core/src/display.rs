//! Window-placement collaborator implemented by platform adapters.
//!
//! The loading pipeline never calls these; they exist so hosts that arrange
//! output windows across monitors can be wired in at the composition root.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chrome styles a host window can adopt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowStyle {
    /// No chrome at all.
    #[default]
    Borderless,
    /// Title bar without resize handles.
    MenuBarNoResize,
    /// Full title bar and resize handles.
    FullMenuBar,
    /// Full title bar, window starts minimised.
    FullMenuBarMinimized,
}

impl WindowStyle {
    /// Machine-friendly label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borderless => "borderless",
            Self::MenuBarNoResize => "menu_bar_no_resize",
            Self::FullMenuBar => "full_menu_bar",
            Self::FullMenuBarMinimized => "full_menu_bar_minimized",
        }
    }
}

/// Control surface for positioning and styling host windows.
///
/// Implementations: [`NoopDisplayControl`] for engine-managed windows, plus
/// OS-specific adapters that enumerate physical monitors and manipulate
/// native window handles.
pub trait DisplayControl: Send + Sync {
    /// Move and resize a window in one call.
    ///
    /// When `relative_to_monitor` is set, `left`/`top` are offsets within the
    /// monitor at `relative_monitor_index` instead of virtual-desktop
    /// coordinates.
    #[allow(clippy::too_many_arguments)]
    fn set_position_and_size(
        &self,
        index: usize,
        left: i32,
        top: i32,
        relative_to_monitor: bool,
        relative_monitor_index: usize,
        width: i32,
        height: i32,
    ) -> anyhow::Result<()>;

    /// Move a window without changing its size.
    fn set_position(
        &self,
        index: usize,
        left: i32,
        top: i32,
        relative_to_monitor: bool,
        relative_monitor_index: usize,
    ) -> anyhow::Result<()>;

    /// Resize a window without moving it.
    fn set_size(&self, index: usize, width: i32, height: i32) -> anyhow::Result<()>;

    /// Apply a chrome style to a window.
    fn set_window_style(&self, index: usize, style: WindowStyle) -> anyhow::Result<()>;

    /// Re-enumerate native window handles after a display is attached.
    fn refresh_display_pointers(&self) -> anyhow::Result<()>;
}

/// Display control for hosts whose engine manages its own windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDisplayControl;

impl DisplayControl for NoopDisplayControl {
    fn set_position_and_size(
        &self,
        index: usize,
        left: i32,
        top: i32,
        relative_to_monitor: bool,
        relative_monitor_index: usize,
        width: i32,
        height: i32,
    ) -> anyhow::Result<()> {
        debug!(
            index,
            left, top, relative_to_monitor, relative_monitor_index, width, height,
            "display control unavailable; ignoring position-and-size request"
        );
        Ok(())
    }

    fn set_position(
        &self,
        index: usize,
        left: i32,
        top: i32,
        relative_to_monitor: bool,
        relative_monitor_index: usize,
    ) -> anyhow::Result<()> {
        debug!(
            index,
            left, top, relative_to_monitor, relative_monitor_index,
            "display control unavailable; ignoring position request"
        );
        Ok(())
    }

    fn set_size(&self, index: usize, width: i32, height: i32) -> anyhow::Result<()> {
        debug!(index, width, height, "display control unavailable; ignoring size request");
        Ok(())
    }

    fn set_window_style(&self, index: usize, style: WindowStyle) -> anyhow::Result<()> {
        debug!(
            index,
            style = style.as_str(),
            "display control unavailable; ignoring style request"
        );
        Ok(())
    }

    fn refresh_display_pointers(&self) -> anyhow::Result<()> {
        debug!("display control unavailable; nothing to refresh");
        Ok(())
    }
}
