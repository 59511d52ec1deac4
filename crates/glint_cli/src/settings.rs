use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use glam::Vec3;
use glint_core::{Camera, Color, PointLight};

/// Rendering backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Recursive CPU ray tracer with shadow rays
    Raytracer,
    /// Depth-buffered triangle rasterizer
    Rasterizer,
}

/// A point light given on the command line as `x,y,z:r,g,b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSpec {
    pub position: Vec3,
    pub color: Color,
}

impl FromStr for LightSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (position, color) = s
            .split_once(':')
            .ok_or_else(|| format!("expected `x,y,z:r,g,b`, got `{s}`"))?;
        Ok(Self {
            position: parse_vec3(position)?,
            color: parse_vec3(color)?,
        })
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected three comma-separated values, got `{s}`"));
    }
    let mut v = [0.0f32; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("`{part}` is not a number"))?;
    }
    Ok(Vec3::from_array(v))
}

/// Command-line settings for a single render.
#[derive(Parser, Debug)]
#[command(name = "glint")]
#[command(version, about = "Software renderer with ray traced and rasterized backends")]
pub struct RenderSettings {
    /// Wavefront OBJ model to render
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// Output image path
    #[arg(long, value_name = "FILE", default_value = "render.png")]
    pub output: PathBuf,

    /// Rendering backend
    #[arg(long, value_enum, default_value_t = RendererKind::Raytracer)]
    pub renderer: RendererKind,

    /// Image width in pixels
    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Camera position as `x,y,z`
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,5", allow_hyphen_values = true)]
    pub camera_position: Vec3,

    /// Camera yaw in degrees, positive turns right
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub camera_phi: f32,

    /// Camera pitch in degrees, positive looks up
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub camera_theta: f32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    pub fov: f32,

    /// Near clip plane distance
    #[arg(long, default_value_t = 0.001)]
    pub z_near: f32,

    /// Far clip plane distance
    #[arg(long, default_value_t = 100.0)]
    pub z_far: f32,

    /// Ray recursion budget for the ray traced backend
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub depth: u32,

    /// Rays averaged per pixel
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub samples: u32,

    /// Point light as `x,y,z:r,g,b`, may be repeated. Replaces the built-in rig
    #[arg(long = "light", value_name = "SPEC", allow_hyphen_values = true)]
    pub lights: Vec<LightSpec>,
}

impl RenderSettings {
    pub fn camera(&self) -> Camera {
        Camera::new(self.camera_position)
            .with_angles(self.camera_phi.to_radians(), self.camera_theta.to_radians())
            .with_fov_y(self.fov.to_radians())
            .with_clip(self.z_near, self.z_far)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Lights from the command line, or the built-in four-point rig.
    pub fn light_rig(&self) -> Vec<PointLight> {
        if self.lights.is_empty() {
            return default_light_rig();
        }
        self.lights
            .iter()
            .map(|spec| PointLight::new(spec.position, spec.color))
            .collect()
    }
}

/// Four dim white lights just below a ceiling at y = 1.8.
fn default_light_rig() -> Vec<PointLight> {
    let white = Color::splat(0.78) * 0.25;
    vec![
        PointLight::new(Vec3::new(-0.24, 1.8, -0.22), white),
        PointLight::new(Vec3::new(0.23, 1.8, 0.16), white),
        PointLight::new(Vec3::new(0.23, 1.8, -0.22), white),
        PointLight::new(Vec3::new(-0.24, 1.8, 0.16), white),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RenderSettings, clap::Error> {
        let base = ["glint", "--model", "scene.obj"];
        RenderSettings::try_parse_from(base.iter().copied().chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]).unwrap();
        assert_eq!(settings.width, 1280);
        assert_eq!(settings.height, 720);
        assert_eq!(settings.renderer, RendererKind::Raytracer);
        assert_eq!(settings.depth, 10);
        assert_eq!(settings.samples, 1);
        assert_eq!(settings.camera_position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(settings.output, PathBuf::from("render.png"));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(parse(&["--width", "0"]).is_err());
        assert!(parse(&["--height", "0"]).is_err());
        assert!(parse(&["--depth", "0"]).is_err());
        assert!(parse(&["--samples", "0"]).is_err());
    }

    #[test]
    fn test_negative_camera_values() {
        let settings = parse(&[
            "--camera-position",
            "-1.5,2,-3",
            "--camera-phi",
            "-45",
        ])
        .unwrap();
        assert_eq!(settings.camera_position, Vec3::new(-1.5, 2.0, -3.0));
        assert_eq!(settings.camera_phi, -45.0);
    }

    #[test]
    fn test_light_spec_parsing() {
        let spec: LightSpec = "0,1.8,0:0.5,0.5,0.5".parse().unwrap();
        assert_eq!(spec.position, Vec3::new(0.0, 1.8, 0.0));
        assert_eq!(spec.color, Color::splat(0.5));

        assert!("0,1.8,0".parse::<LightSpec>().is_err());
        assert!("0,1.8:0.5,0.5,0.5".parse::<LightSpec>().is_err());
        assert!("a,b,c:0.5,0.5,0.5".parse::<LightSpec>().is_err());
    }

    #[test]
    fn test_light_rig_defaults_and_override() {
        let settings = parse(&[]).unwrap();
        assert_eq!(settings.light_rig().len(), 4);

        let settings = parse(&["--light", "0,2,0:1,1,1"]).unwrap();
        let rig = settings.light_rig();
        assert_eq!(rig.len(), 1);
        assert_eq!(rig[0].position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_renderer_selection() {
        let settings = parse(&["--renderer", "rasterizer"]).unwrap();
        assert_eq!(settings.renderer, RendererKind::Rasterizer);
    }
}
