use super::AppContext;
use crate::output::Output;
use crate::ConfigCommands;
use catalog_sync_config::{Config, ReleaseDatePolicy};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(ctx: AppContext, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(&ctx, output),
        ConfigCommands::Init { feed_url, force } => init_config(&ctx, feed_url, force, output),
        ConfigCommands::SetFeed { url } => set_feed(ctx, url, output),
    }
}

fn show_config(ctx: &AppContext, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let file_exists = ctx.config_file.exists();

    output.render(
        || {
            json!({
                "config_file": ctx.config_file.display().to_string(),
                "config_file_exists": file_exists,
                "catalog_file": config.catalog_path(&ctx.paths).display().to_string(),
                "daemon_log_file": ctx.daemon_log_file().display().to_string(),
                "config": config,
            })
        },
        || print_config_tables(ctx, output),
    );
    Ok(())
}

fn print_config_tables(ctx: &AppContext, output: &Output) {
    let config = &ctx.config;
    if !ctx.config_file.exists() {
        output.warn(format!("Configuration file not found at: {} (showing defaults)", ctx.config_file.display()));
        output.info("Run 'reelsync config init' to create it.");
    }

    let mut files_table = section_table("Files");
    files_table.add_row(vec![Cell::new("Config File"), Cell::new(ctx.config_file.display())]);
    files_table.add_row(vec![Cell::new("Catalog"), Cell::new(config.catalog_path(&ctx.paths).display())]);
    files_table.add_row(vec![Cell::new("Daemon Log"), Cell::new(ctx.daemon_log_file().display())]);
    println!("{}", files_table);
    println!();

    let mut feed_table = section_table("Feed");
    feed_table.add_row(vec![Cell::new("URL"), Cell::new(&config.feed.url)]);
    feed_table.add_row(vec![
        Cell::new("Release Date Policy"),
        Cell::new(match config.feed.release_date_policy {
            ReleaseDatePolicy::Lenient => "lenient (unparseable dates use the sync date)",
            ReleaseDatePolicy::Strict => "strict (unparseable dates are rejected)",
        }),
    ]);
    println!("{}", feed_table);
    println!();

    let mut scheduler_table = section_table("Scheduler");
    scheduler_table.add_row(vec![
        Cell::new("Refresh Interval"),
        Cell::new(format!("{} seconds", config.scheduler.refresh_interval_secs)),
    ]);
    scheduler_table.add_row(vec![
        Cell::new("Run On Startup"),
        Cell::new(check_mark(config.scheduler.run_on_startup)),
    ]);
    println!("{}", scheduler_table);
    println!();

    let mut logging_table = section_table("Logging");
    logging_table.add_row(vec![Cell::new("Level"), Cell::new(&config.logging.level)]);
    logging_table.add_row(vec![Cell::new("JSON"), Cell::new(check_mark(config.logging.json))]);
    println!("{}", logging_table);

    if let Err(e) = config.validate() {
        println!();
        output.error(format!("Configuration is invalid: {}", e));
    }
}

fn section_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn check_mark(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn init_config(ctx: &AppContext, feed_url: Option<String>, force: bool, output: &Output) -> Result<()> {
    if ctx.config_file.exists() && !force {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file already exists at {} (use --force to overwrite)",
            ctx.config_file.display()
        ));
    }

    let mut config = Config::default();
    if let Some(url) = feed_url {
        config.feed.url = url;
    }
    save_validated(ctx, &config)?;

    ctx.paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create data directories: {}", e))?;

    output.success(format!("Configuration written to {}", ctx.config_file.display()));
    Ok(())
}

fn set_feed(ctx: AppContext, url: String, output: &Output) -> Result<()> {
    let mut config = ctx.config.clone();
    let previous = std::mem::replace(&mut config.feed.url, url);
    save_validated(&ctx, &config)?;

    tracing::info!(operation = "config_set_feed", from = %previous, to = %config.feed.url, "Feed URL changed");
    output.success(format!("Feed URL set to {}", config.feed.url));
    Ok(())
}

/// Refuse to write a config the sync commands would reject
fn save_validated(ctx: &AppContext, config: &Config) -> Result<()> {
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    config
        .save_to_file(&ctx.config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", ctx.config_file.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use catalog_sync_config::PathManager;

    fn context(dir: &std::path::Path) -> AppContext {
        let config_file = dir.join("config.toml");
        AppContext {
            paths: PathManager::with_base(dir.to_path_buf()),
            config: Config::load_or_default(&config_file).unwrap(),
            config_file,
        }
    }

    #[test]
    fn test_init_then_set_feed() {
        let dir = tempfile::tempdir().unwrap();
        let output = Output::new(OutputFormat::Json, true);

        init_config(&context(dir.path()), None, false, &output).unwrap();
        assert!(init_config(&context(dir.path()), None, false, &output).is_err());

        set_feed(context(dir.path()), "https://example.com/movies.json".to_string(), &output).unwrap();
        assert_eq!(context(dir.path()).config.feed.url, "https://example.com/movies.json");
    }

    #[test]
    fn test_invalid_feed_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let output = Output::new(OutputFormat::Json, true);

        assert!(set_feed(context(dir.path()), "file:///etc/passwd".to_string(), &output).is_err());
        assert!(!dir.path().join("config.toml").exists());
    }
}
