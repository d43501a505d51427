use std::io::IsTerminal;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use tealeaf::apps::{AltScreen, Check, Repos};
use tealeaf::config::{self, AppConfig};
use tealeaf::core::{Model, Program};
use tealeaf::theme::available_themes;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Demo;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;

    let args = cli::Args::parse();
    info!(demo = ?args.demo, "Starting tealeaf");

    let mut config = config::load()?;
    args.apply(&mut config);

    match args.demo {
        Demo::Altscreen => {
            let model = AltScreen::new(config.keybindings.clone())
                .starting_in_altscreen(config.program.alt_screen);
            run(model, &config).await?;
        }
        Demo::Check { url } => {
            run(Check::new(url, config.keybindings.clone()), &config).await?;
        }
        Demo::Repos { url } => {
            let model = run(Repos::new(url, config.keybindings.clone()), &config).await?;
            info!(choice = %model.value(), "repository picked");
        }
        Demo::Bake => {
            let ansi = std::io::stdout().is_terminal();
            tokio::task::spawn_blocking(move || {
                tealeaf::bake::run(std::io::stdout, ansi, Duration::from_secs(1));
            })
            .await?;
        }
        Demo::Themes => {
            for theme in available_themes() {
                println!("{theme}");
            }
        }
        Demo::Config { save } => {
            if let Some(path) = config::config_path() {
                eprintln!("config file: {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
            if save && let Some(path) = config::save(&config)? {
                eprintln!("saved to {}", path.display());
            }
        }
    }

    Ok(())
}

async fn run<M: Model>(model: M, config: &AppConfig) -> Result<M> {
    let model = Program::new(model)
        .with_options(config.program_options())
        .with_styles(config.styles())
        .run()
        .await?;
    Ok(model)
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("tealeaf").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "tealeaf.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
