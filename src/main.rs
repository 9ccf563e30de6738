//! Cube Raster command line
//!
//! `render` writes a PPM or PNG, `view` opens a preview window,
//! `demo` writes the built-in scene as a RON file to start from.

mod app;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use cube_raster::rasterizer::ShadingMode;
use cube_raster::world::{load_scene, render_frame, save_image, save_scene, SceneDescriptor};
use cube_raster::VERSION;

#[derive(Parser, Debug)]
#[command(name = "cube-raster", version, about = "CPU software rasterizer for lit cube scenes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene to an image file (.ppm or .png)
    Render {
        #[command(flatten)]
        scene: SceneArgs,
        /// Output image path
        #[arg(short, long, default_value = "out.ppm")]
        output: PathBuf,
    },
    /// Open an interactive preview window
    View {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Write the built-in demo scene as RON
    Demo {
        #[arg(default_value = "demo.ron")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct SceneArgs {
    /// RON scene file; the built-in demo scene when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long, value_enum)]
    shading: Option<ShadingArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShadingArg {
    Flat,
    Phong,
}

impl From<ShadingArg> for ShadingMode {
    fn from(arg: ShadingArg) -> Self {
        match arg {
            ShadingArg::Flat => ShadingMode::Flat,
            ShadingArg::Phong => ShadingMode::Phong,
        }
    }
}

impl SceneArgs {
    /// Load the scene and apply command line overrides
    fn resolve(&self) -> Result<SceneDescriptor> {
        let mut desc = match &self.scene {
            Some(path) => load_scene(path).with_context(|| format!("loading {}", path.display()))?,
            None => SceneDescriptor::demo(),
        };
        if let Some(w) = self.width {
            desc.width = w;
        }
        if let Some(h) = self.height {
            desc.height = h;
        }
        if let Some(s) = self.shading {
            desc.shading = s.into();
        }
        desc.validate().context("scene after overrides")?;
        Ok(desc)
    }
}

fn window_conf(desc: &SceneDescriptor) -> macroquad::prelude::Conf {
    macroquad::prelude::Conf {
        window_title: format!("Cube Raster v{}", VERSION),
        window_width: desc.width as i32,
        window_height: desc.height as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { scene, output } => {
            let desc = scene.resolve()?;
            let (fb, stats) = render_frame(&desc)?;
            save_image(&fb, &output).with_context(|| format!("writing {}", output.display()))?;
            log::info!(
                "wrote {} ({}x{}, {} shading, {} triangles drawn, {} culled)",
                output.display(),
                desc.width,
                desc.height,
                desc.shading.label(),
                stats.rasterized,
                stats.backface_culled,
            );
        }
        Command::View { scene } => {
            let desc = scene.resolve()?;
            if app::texture_size(desc.width, desc.height).is_none() {
                bail!(
                    "{}x{} is too large for the viewer (at most {} per side)",
                    desc.width,
                    desc.height,
                    u16::MAX
                );
            }
            log::info!("opening viewer ({}x{})", desc.width, desc.height);
            macroquad::Window::from_config(window_conf(&desc), app::run(desc));
        }
        Command::Demo { output } => {
            save_scene(&SceneDescriptor::demo(), &output)
                .with_context(|| format!("writing {}", output.display()))?;
            log::info!("wrote {}", output.display());
        }
    }

    Ok(())
}
