//! Command-line renderer: one XML scene in, one PPM image per camera out.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;

use helios_core::loader::{self, LoadError};
use helios_core::Camera;
use helios_render::render;
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error("usage: helios <scene.xml>")]
    Usage,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("helios: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    let mut args = std::env::args().skip(1);
    let (Some(scene_path), None) = (args.next(), args.next()) else {
        return Err(CliError::Usage);
    };

    let scene = loader::load_scene(&scene_path)?;

    for camera in &scene.cameras {
        let start = Instant::now();
        let image = render(&scene, camera);
        log::info!(
            "rendered {} ({}x{}) in {:?}",
            camera.image_name,
            camera.image_width,
            camera.image_height,
            start.elapsed()
        );
        write_ppm(camera, &image)?;
    }

    Ok(())
}

/// Write a binary P6 PPM; the render buffer is already row-major RGB.
fn write_ppm(camera: &Camera, image: &[u8]) -> std::io::Result<()> {
    let file = File::create(&camera.image_name)?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P6\n{} {}\n255\n", camera.image_width, camera.image_height)?;
    writer.write_all(image)?;
    writer.flush()
}
