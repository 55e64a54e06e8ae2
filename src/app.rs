//! Application setup and window creation.

use anyhow::Context as _;
use gpui::{App, Bounds, WindowBounds, WindowOptions, prelude::*, px, size};
use gpui_component::Root;

use crate::domain::Session;
use crate::engine::ShakmatyFactory;
use crate::models::GameModel;
use crate::ui::views::ChessBoardView;

/// Open the main window for `session`
pub fn run(session: Session<ShakmatyFactory>, cx: &mut App) -> anyhow::Result<()> {
    gpui_component::init(cx);

    let model = cx.new(|_| GameModel::new(session));

    let bounds = Bounds::centered(None, size(px(960.0), px(640.0)), cx);
    cx.open_window(
        WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..Default::default()
        },
        |window, cx| {
            let view = cx.new(|cx| ChessBoardView::new(model, cx));
            cx.new(|cx| Root::new(view, window, cx))
        },
    )
    .context("failed to open the main window")?;
    Ok(())
}
