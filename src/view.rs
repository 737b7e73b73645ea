//! Interactive heatmap viewer.
//!
//! Opens a desktop window showing a rendered framebuffer, scaled to fit,
//! and blocks until the window is closed or Escape is pressed.

use minifb::{Key, ScaleMode, Window, WindowOptions};

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;

/// Display `fb` in a window titled `title` until the user closes it.
///
/// # Errors
///
/// Returns [`Error::Window`] if the window cannot be created or updated
/// (e.g. no display available).
pub fn show(fb: &Framebuffer, title: &str) -> Result<()> {
    let width = fb.width() as usize;
    let height = fb.height() as usize;
    let buffer = fb.to_0rgb_pixels();

    let mut window = Window::new(
        title,
        width,
        height,
        WindowOptions {
            resize: true,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| Error::Window(e.to_string()))?;
    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| Error::Window(e.to_string()))?;
    }

    Ok(())
}
