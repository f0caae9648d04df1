use clap::Parser;
use islegen::{MapGenError, MapSettings, TileType, generate_map};
use std::fs;
use std::path::PathBuf;

/// Генератор гексагональных островов
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Путь для сохранения карты в JSON (по умолчанию: ./map.json)
    #[arg(short, long, default_value = "map.json")]
    output: PathBuf,

    /// Переопределить сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<(), MapGenError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Загрузка конфигурации");
            MapSettings::from_toml_file(path)?
        }
        None => MapSettings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
    }

    let generated = generate_map(&settings)?;
    let map = &generated.map;

    let json = serde_json::to_string_pretty(map)?;
    fs::write(&cli.output, json).map_err(|source| MapGenError::Write {
        path: cli.output.clone(),
        source,
    })?;

    tracing::info!(
        output = %cli.output.display(),
        seed = map.config.seed(),
        tiles = map.len(),
        land = map.count(TileType::Land),
        water = map.count(TileType::Water),
        towns = generated.placement.placed,
        requested = generated.placement.requested,
        demoted = generated.demoted,
        "Готово! Карта сохранена"
    );
    Ok(())
}
