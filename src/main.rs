use orbit_viewer::{config::ViewerConfig, resources, viewer};

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init()
    {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let config = ViewerConfig::from_args(std::env::args());
    log::info!("Loading {}", config.model_path.display());
    let scene = match resources::load_scene(&config.model_path) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Failed to load model {}: {e:#}", config.model_path.display());
            return Err(e);
        }
    };

    viewer::run(config, scene)
}
