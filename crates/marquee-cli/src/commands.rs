//! Command handlers.
//!
//! Each handler talks to the API through one shared `ApiClient`, so every
//! command benefits from the transport's token refresh. A refresh failure
//! comes back as `ApiError::SessionInvalidated` and is turned into a
//! "log in again" message by `main`.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use marquee_core::models::{Actor, Genre, Movie, Resource, Review};
use marquee_core::{ApiClient, Config, Session};

use crate::cli::{Cli, Command, MovieAction, ResourceAction};
use crate::output::{self, TableRow};
use crate::utils::{merge_payload, parse_payload};

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    let base_url = config.api_url(cli.api_url.as_deref());
    debug!(base_url = %base_url, storage = ?config.token_storage, "Using API");

    let session = if cli.ephemeral {
        Session::in_memory()
    } else {
        let session = Session::new(config.token_store()?);
        if let Err(e) = session.load().await {
            warn!(error = %e, "Ignoring unreadable stored session");
        }
        session
    };
    let client = ApiClient::new(&base_url, Arc::new(session))?;

    match cli.command {
        Command::Login { username, password } => {
            login(&client, &mut config, username, password).await
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => status(&client, &config, &base_url).await,
        Command::Dashboard
        | Command::Movies {
            action: MovieAction::Stats,
        } => dashboard(&client, cli.json).await,
        Command::Genres { action } => resource::<Genre>(&client, action, cli.json).await,
        Command::Actors { action } => resource::<Actor>(&client, action, cli.json).await,
        Command::Movies {
            action: MovieAction::Resource(action),
        } => resource::<Movie>(&client, action, cli.json).await,
        Command::Reviews { action } => resource::<Review>(&client, action, cli.json).await,
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

async fn login(
    client: &ApiClient,
    config: &mut Config,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(u) => u,
        None => prompt("Username: ")?,
    };
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password(format!("Password for {}: ", username))
            .context("Failed to read password")?,
    };

    client
        .login(&username, &password)
        .await
        .context("Login failed")?;

    config.last_username = Some(username.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
    println!("Logged in as {}", username);
    Ok(())
}

async fn status(client: &ApiClient, config: &Config, base_url: &str) -> Result<()> {
    println!("API:     {}", base_url);
    println!("Storage: {:?}", config.token_storage);
    if client.restore_session().await? {
        match config.last_username {
            Some(ref u) => println!("Session: logged in as {}", u),
            None => println!("Session: logged in"),
        }
    } else {
        println!("Session: not logged in");
    }
    Ok(())
}

#[derive(Serialize)]
struct Dashboard {
    #[serde(flatten)]
    stats: marquee_core::models::MovieStats,
    total_genres: usize,
    total_actors: usize,
}

async fn dashboard(client: &ApiClient, json: bool) -> Result<()> {
    let (stats, genres, actors) = futures::try_join!(
        client.movie_stats(),
        client.list::<Genre>(),
        client.list::<Actor>(),
    )
    .context("Failed to load dashboard")?;

    if json {
        let dashboard = Dashboard {
            stats,
            total_genres: genres.len(),
            total_actors: actors.len(),
        };
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("Genres:        {}", genres.len());
        println!("Actors:        {}", actors.len());
        println!("{}", output::render_stats(&stats));
    }
    Ok(())
}

async fn resource<R>(client: &ApiClient, action: ResourceAction, json: bool) -> Result<()>
where
    R: Resource + TableRow,
{
    match action {
        ResourceAction::List => {
            let items = client
                .list::<R>()
                .await
                .with_context(|| format!("Failed to list {}", R::PATH))?;
            output::print_list(&items, json)
        }
        ResourceAction::Get { id } => {
            let item = client
                .get::<R>(id)
                .await
                .with_context(|| format!("Failed to fetch {} {}", R::PATH, id))?;
            output::print_item(&item, json)
        }
        ResourceAction::Create { data } => {
            let input: R::Input = parse_payload(&data)?;
            let created = client
                .create::<R>(&input)
                .await
                .with_context(|| format!("Failed to create in {}", R::PATH))?;
            output::print_item(&created, json)
        }
        ResourceAction::Update { id, data } => {
            let current = client
                .get::<R>(id)
                .await
                .with_context(|| format!("Failed to fetch {} {}", R::PATH, id))?;
            let input = merge_payload(&current.to_input(), &data)?;
            let updated = client
                .update::<R>(id, &input)
                .await
                .with_context(|| format!("Failed to update {} {}", R::PATH, id))?;
            output::print_item(&updated, json)
        }
        ResourceAction::Delete { id } => {
            client
                .delete::<R>(id)
                .await
                .with_context(|| format!("Failed to delete {} {}", R::PATH, id))?;
            println!("Deleted {} {}", R::PATH, id);
            Ok(())
        }
    }
}
