//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

pub const WINDOW_TITLE: &str = "Phong Viewer";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "phong-viewer")]
#[command(author, version, about = "Phong-lit OBJ viewer with a free-fly camera")]
pub struct Args {
    /// Wavefront OBJ file to display (only `v` and triangular `f` lines are read)
    #[arg(long, short = 'm', default_value = "assets/model.obj")]
    pub model: PathBuf,

    /// Image mapped onto the model; white when omitted or unreadable
    #[arg(long, short = 't')]
    pub texture: Option<PathBuf>,

    /// Directory holding mesh.{vert,frag}.wgsl and light.{vert,frag}.wgsl
    #[arg(long, default_value = "shaders")]
    pub shader_dir: PathBuf,

    /// Initial window width in pixels
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "750", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Wait for vertical sync when presenting
    #[arg(long)]
    pub vsync: bool,
}
