mod error;
mod scene;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cuosd_core::surface::RgbaSurface;
use cuosd_core::{AuxInputs, Config, LaunchRequest, Surface};
use error::DemoError;

#[derive(Parser)]
#[command(name = "cuosd-cli")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the built-in demo scene onto a copy of an input PNG.
    Render {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    if !cli.quiet {
        env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Info).init();
    }

    let result = match cli.command {
        Commands::Render { input, output } => render(&input, &output),
    };

    if let Err(e) = result {
        log::error!("cuosd-cli: {e}");
        std::process::exit(1);
    }
}

fn render(input: &PathBuf, output: &PathBuf) -> Result<(), DemoError> {
    let img = image::open(input).map_err(|source| DemoError::Read { path: input.clone(), source })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::info!("cuosd-cli: loaded {}x{} image from {}", width, height, input.display());

    let demo = scene::build_demo_scene(width, height);
    let stride = width as usize * 4;
    let mut raw = rgba.into_raw();
    let mut surface = Surface::Rgba(RgbaSurface { data: &mut raw, width, height, stride });

    let request = LaunchRequest {
        commands: &demo.commands,
        offsets: &demo.offsets,
        aux: AuxInputs::empty(),
        global_bounds: demo.global_bounds,
        have_rotate_msaa: true,
        blur_rects: &demo.blur_rects,
    };
    cuosd_core::launch(&mut surface, &request, &Config::default());
    drop(surface);

    let out_img = image::RgbaImage::from_raw(width, height, raw)
        .expect("raw buffer length matches width*height*4 by construction");
    out_img.save(output).map_err(|source| DemoError::Write { path: output.clone(), source })?;
    log::info!("cuosd-cli: wrote {}", output.display());
    Ok(())
}
