use std::path::PathBuf;

use clap::Parser;

use navscope::mount::Mount;

#[derive(Parser, Debug)]
#[command(name = "mount-host", version, about = "Serial stepper host for a pan/tilt mount and focuser")]
struct Args {
    /// Path to the mount configuration file
    #[arg(default_value = "mount.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    tracing::info!("Starting mount host");
    tracing::info!("Loading configuration from: {}", args.config.display());

    let config = navscope::load_config(&args.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", args.config.display(), e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("Mount: {}", config.mount.name);
    tracing::info!(
        "Turret: {} @ {} baud, focus: {} @ {} baud",
        config.turret.port,
        config.turret.baud,
        config.focus.port,
        config.focus.baud
    );
    tracing::info!(
        "Tilt travel: {:?} .. {:?} steps, slew distance {}",
        config.axes.tilt.limit_down,
        config.axes.tilt.limit_up,
        config.motion.slew_distance
    );

    let mut mount = Mount::new(config)?;
    mount.start().await?;

    let shutdown = mount.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping mount");
            let _ = shutdown.send(());
        }
    });

    mount.run().await?;
    Ok(())
}
