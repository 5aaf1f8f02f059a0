use clap::Parser;

use phong_viewer::config::Args;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = phong_viewer::app::run(args) {
        log::error!("{err:?}");
        std::process::exit(1);
    }
}
