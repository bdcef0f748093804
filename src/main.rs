mod cli;

use arrlink::arr::{self, RadarrClient, SonarrClient};
use arrlink::config::{self, ArrConfig, ArrType, Config};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "arrlink=trace,arrlink_common=debug".to_string()
        } else {
            "arrlink=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("arrlink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_command(command, &config))
        }
    }
}

async fn run_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Status { instance } => show_status(instance_config(config, &instance)?).await,
        Commands::Tags { instance, detail } => {
            list_tags(instance_config(config, &instance)?, detail).await
        }
        Commands::Profiles { instance } => {
            list_profiles(instance_config(config, &instance)?).await
        }
        Commands::RootFolders { instance } => {
            list_root_folders(instance_config(config, &instance)?).await
        }
        Commands::Search { instance, term } => {
            search(instance_config(config, &instance)?, &term).await
        }
        Commands::Validate { .. } | Commands::Version => Ok(()),
    }
}

fn instance_config<'a>(config: &'a Config, name: &str) -> Result<&'a ArrConfig> {
    let instance = config
        .find_instance(Some(name))
        .with_context(|| format!("No instance named '{}' in config", name))?;
    if !instance.enabled {
        anyhow::bail!("Instance '{}' is disabled", name);
    }
    Ok(instance)
}

async fn show_status(instance: &ArrConfig) -> Result<()> {
    let client = arr::connect(instance)
        .await
        .with_context(|| format!("Failed to connect to '{}'", instance.name))?;
    let status = client.system_status().await?;
    let fields = status.fields();

    println!("Instance: {} ({})", instance.name, client.kind());
    println!("URL: {}", client.api().base_url());
    println!("Version: {}", status.version());
    println!("API dialect: {}", client.api().dialect());
    if let Some(app_name) = status.app_name() {
        println!("Application: {}", app_name);
    }
    if let Some(branch) = &fields.branch {
        println!("Branch: {}", branch);
    }
    if let Some(os_name) = &fields.os_name {
        println!(
            "OS: {} {}",
            os_name,
            fields.os_version.as_deref().unwrap_or_default()
        );
    }
    if let Some(start_time) = fields.start_time {
        println!("Started: {}", start_time.to_rfc3339());
    }

    Ok(())
}

async fn list_tags(instance: &ArrConfig, detail: bool) -> Result<()> {
    let client = arr::connect(instance).await?;
    let tags = client.all_tags(detail).await?;

    println!("Tags: {}", tags.len());
    for tag in &tags {
        if !tag.is_detailed() {
            println!("  {}", tag);
            continue;
        }
        let fields = tag.fields();
        let attached: usize = [
            &fields.movie_ids,
            &fields.series_ids,
            &fields.artist_ids,
            &fields.author_ids,
        ]
        .into_iter()
        .flatten()
        .map(Vec::len)
        .sum();
        println!("  {} - {} items", tag, attached);
    }

    Ok(())
}

async fn list_profiles(instance: &ArrConfig) -> Result<()> {
    let client = arr::connect(instance).await?;

    let quality = client.quality_profiles().await?;
    println!("Quality profiles: {}", quality.len());
    for profile in &quality {
        println!("  {}", profile);
    }

    let api = client.api();
    if instance.arr_type == ArrType::Sonarr && api.dialect().has_language_profiles() {
        let language = api.language_profiles().await?;
        println!("\nLanguage profiles: {}", language.len());
        for profile in &language {
            println!("  {}", profile);
        }
    }
    if instance.arr_type.uses_v1() {
        let metadata = api.metadata_profiles().await?;
        println!("\nMetadata profiles: {}", metadata.len());
        for profile in &metadata {
            println!("  {}", profile);
        }
    }

    Ok(())
}

async fn list_root_folders(instance: &ArrConfig) -> Result<()> {
    let client = arr::connect(instance).await?;
    let folders = client.root_folders().await?;

    println!("Root folders: {}", folders.len());
    for folder in &folders {
        print!("  {}", folder);
        if let Some(free) = folder.free_space() {
            print!(" ({:.1} GiB free)", free as f64 / (1024.0 * 1024.0 * 1024.0));
        }
        println!();
        let unmapped = folder.unmapped_folders();
        if !unmapped.is_empty() {
            println!("      {} unmapped folders", unmapped.len());
        }
    }

    Ok(())
}

async fn search(instance: &ArrConfig, term: &str) -> Result<()> {
    let api = arr::connect_api(instance).await?;

    match instance.arr_type {
        ArrType::Radarr => {
            let movies = RadarrClient::new(api).search_movies(term).await?;
            println!("Results: {}", movies.len());
            for movie in &movies {
                let fields = movie.fields();
                println!(
                    "  {} ({}) tmdb:{}{}",
                    movie.title().unwrap_or("Unknown"),
                    fields.year.map(|y| y.to_string()).unwrap_or_default(),
                    movie.tmdb_id().map(|id| id.to_string()).unwrap_or_default(),
                    if movie.id().is_some() { " [added]" } else { "" }
                );
            }
        }
        ArrType::Sonarr => {
            let series = SonarrClient::new(api).search_series(term).await?;
            println!("Results: {}", series.len());
            for show in &series {
                let fields = show.fields();
                println!(
                    "  {} ({}) tvdb:{}{}",
                    show.title().unwrap_or("Unknown"),
                    fields.year.map(|y| y.to_string()).unwrap_or_default(),
                    show.tvdb_id().map(|id| id.to_string()).unwrap_or_default(),
                    if show.id().is_some() { " [added]" } else { "" }
                );
            }
        }
        other => anyhow::bail!("Search is not supported for {} instances", other),
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Instances: {}", config.instances.len());
            for instance in &config.instances {
                println!(
                    "    {} ({}) {}{}",
                    instance.name,
                    instance.arr_type,
                    instance.url,
                    if instance.enabled { "" } else { " [disabled]" }
                );
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::load_config_or_default(None)?;
            println!("  Instances: {}", config.instances.len());
        }
    }

    Ok(())
}
