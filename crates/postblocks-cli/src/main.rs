use anyhow::{Context, Result};
use postblocks_config::Config;
use postblocks_engine::parse_blocks;
use std::{
    env,
    io::{self, Read},
    path::{Path, PathBuf},
    process,
};

fn read_document(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut document = String::new();
        io::stdin()
            .read_to_string(&mut document)
            .context("Failed to read document from stdin")?;
        return Ok(document);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document '{}'", path.display()))
}

fn load_config(explicit: Option<&Path>) -> Config {
    let config_path = explicit.map_or_else(Config::config_path, Path::to_path_buf);
    log::info!("Config path: {}", config_path.display());

    match Config::load_from_path(&config_path) {
        Ok(Some(config)) => config,
        Ok(None) if explicit.is_some() => {
            eprintln!("Error: Config file '{}' not found", config_path.display());
            process::exit(1);
        }
        Ok(None) => {
            log::warn!(
                "No config file at {}, every section will be dropped",
                config_path.display()
            );
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    let (document_path, config_path) = match args.as_slice() {
        [_, document] => (PathBuf::from(document), None),
        [_, document, config] => (PathBuf::from(document), Some(PathBuf::from(config))),
        _ => {
            let program = args.first().map_or("postblocks", String::as_str);
            eprintln!("Usage: {program} <document|-> [config.toml]");
            eprintln!("Without a config argument, {} is used", Config::config_path().display());
            process::exit(1);
        }
    };

    let config = load_config(config_path.as_deref());
    let registry = match config.to_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let document = read_document(&document_path)?;
    let blocks = match parse_blocks(&document, &registry) {
        Ok(blocks) => blocks,
        Err(e) => {
            eprintln!("Error: '{}' is not a valid post document: {e}", document_path.display());
            process::exit(1);
        }
    };

    log::info!("{} blocks", blocks.len());
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
