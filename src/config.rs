use std::path::PathBuf;

use anyhow::{Context as _, bail};

use crate::resources::{LoadOptions, TextureFallback};

pub const DEFAULT_MODEL: &str = "assets/backpack/backpack.obj";
pub const DEFAULT_ASSETS: &str = "assets";
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (800, 600);

pub const USAGE: &str =
    "usage: lightbox [MODEL] [--assets <dir>] [--strict-textures] [--size <width>x<height>]";

/// Settings of the demo binary.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Scene file loaded into the middle of the demo.
    pub model_path: PathBuf,
    /// Directory holding the cube textures.
    pub assets_dir: PathBuf,
    pub window_size: (u32, u32),
    pub load: LoadOptions,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL),
            assets_dir: PathBuf::from(DEFAULT_ASSETS),
            window_size: DEFAULT_WINDOW_SIZE,
            load: LoadOptions::default(),
        }
    }
}

impl DemoConfig {
    /// Parses the arguments after the program name.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut model = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--assets" => {
                    let dir = args.next().context("--assets needs a directory")?;
                    config.assets_dir = PathBuf::from(dir);
                }
                "--strict-textures" => {
                    config.load.on_texture_error = TextureFallback::Abort;
                }
                "--size" => {
                    let size = args.next().context("--size needs <width>x<height>")?;
                    config.window_size = parse_size(&size)?;
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                path => {
                    if model.replace(PathBuf::from(path)).is_some() {
                        bail!("more than one model path given\n{USAGE}");
                    }
                }
            }
        }
        if let Some(model) = model {
            config.model_path = model;
        }
        Ok(config)
    }
}

fn parse_size(size: &str) -> anyhow::Result<(u32, u32)> {
    let (width, height) = size
        .split_once(['x', 'X'])
        .with_context(|| format!("window size {size:?} is not <width>x<height>"))?;
    let width: u32 = width
        .trim()
        .parse()
        .with_context(|| format!("bad window width {width:?}"))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("bad window height {height:?}"))?;
    if width == 0 || height == 0 {
        bail!("window size must be non-zero, got {width}x{height}");
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<DemoConfig> {
        DemoConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_gives_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.load.on_texture_error, TextureFallback::Placeholder);
        assert!(config.load.import.flip_uvs);
    }

    #[test]
    fn all_options() {
        let config = parse(&[
            "models/ship.gltf",
            "--assets",
            "res",
            "--strict-textures",
            "--size",
            "1280x720",
        ])
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("models/ship.gltf"));
        assert_eq!(config.assets_dir, PathBuf::from("res"));
        assert_eq!(config.window_size, (1280, 720));
        assert_eq!(config.load.on_texture_error, TextureFallback::Abort);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--size", "1280"]).is_err());
        assert!(parse(&["--size", "0x10"]).is_err());
        assert!(parse(&["--assets"]).is_err());
        assert!(parse(&["--wireframe"]).is_err());
        assert!(parse(&["a.obj", "b.obj"]).is_err());
    }
}
