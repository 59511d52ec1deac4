//! Command-line renderer. Loads an OBJ scene and writes a PNG using either
//! the ray traced or the rasterized backend.

mod raster;
mod raytrace;
mod settings;

use anyhow::Result;
use clap::Parser;

use crate::settings::{RenderSettings, RendererKind};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let settings = RenderSettings::parse();
    log::info!(
        "Rendering {} at {}x{}",
        settings.model.display(),
        settings.width,
        settings.height
    );

    let image = match settings.renderer {
        RendererKind::Raytracer => raytrace::render(&settings)?,
        RendererKind::Rasterizer => raster::render(&settings)?,
    };

    image.save_png(&settings.output)?;
    log::info!("Saved {}", settings.output.display());
    Ok(())
}
