//! Row-band parallel rendering.
//!
//! The output buffer is split into bands of whole rows; each band is an
//! exclusive mutable slice, so workers share nothing but the read-only
//! scene and rayon's final join is the only synchronization. Band count
//! never changes the output: every pixel is shaded independently.

use std::thread;

use helios_core::{Camera, Scene};
use log::debug;
use rayon::prelude::*;

use crate::shader::shade;

/// Render `camera`'s view of `scene` into an H*W*3 RGB byte buffer,
/// using one band per detected hardware thread.
pub fn render(scene: &Scene, camera: &Camera) -> Vec<u8> {
    let bands = thread::available_parallelism().map_or(1, |n| n.get());
    render_with_bands(scene, camera, bands)
}

/// Render with an explicit band count.
pub fn render_with_bands(scene: &Scene, camera: &Camera, bands: usize) -> Vec<u8> {
    let width = camera.image_width;
    let height = camera.image_height;
    let mut buffer = vec![0u8; width * height * 3];
    if buffer.is_empty() {
        return buffer;
    }

    let band_rows = (height / bands.max(1)).max(1);
    debug!(
        "rendering {}x{} in bands of {} rows",
        width, height, band_rows
    );

    buffer
        .par_chunks_mut(band_rows * width * 3)
        .enumerate()
        .for_each(|(band, rows)| render_rows(scene, camera, band * band_rows, rows));

    buffer
}

/// Shade a band's rows, row-major, into its slice of the buffer.
fn render_rows(scene: &Scene, camera: &Camera, first_row: usize, rows: &mut [u8]) {
    let width = camera.image_width;
    for (index, pixel) in rows.chunks_exact_mut(3).enumerate() {
        let row = first_row + index / width;
        let col = index % width;
        let ray = camera.primary_ray(row, col);
        pixel.copy_from_slice(&shade(scene, &ray, scene.max_recursion_depth));
    }
}
