//! `colloquy config`: show the effective configuration.

use colloquy_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;

    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!();
    print!("{}", config.redacted_toml());

    let warnings = warnings(&config);
    if !warnings.is_empty() {
        println!();
        for w in &warnings {
            println!("# warning: {w}");
        }
    }

    Ok(())
}

fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() {
        warnings.push("no completion API key set (COLLOQUY_API_KEY or OPENAI_API_KEY)");
    }
    if config.tools.weather_api_key.is_none() {
        warnings.push("WEATHER_API_KEY not set, weather tool disabled");
    }
    if config.tools.stock_api_key.is_none() {
        warnings.push("STOCK_API_KEY not set, stock tool disabled");
    }
    warnings
}
