use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use fotovault_api::{AlbumApi, ApiClient, Url};
use fotovault_client::{media, AlbumController, BatchReport, ClientConfig, PendingUpload};
use fotovault_store::Database;

#[derive(Parser)]
#[command(name = "fotovault")]
#[command(about = "Client for a self-hosted photo album server", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account, then log in with the same credentials
    Register {
        username: String,
    },
    /// Log in and persist the session
    Login {
        username: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show login state and remaining session validity
    Status,
    /// List the album contents
    List,
    /// Upload images (any common format; re-encoded to JPEG)
    Upload {
        #[arg(required = true, help = "Paths of images to upload")]
        paths: Vec<PathBuf>,
    },
    /// Delete files by name
    Delete {
        #[arg(required = true, help = "Filenames to delete")]
        filenames: Vec<String>,
    },
    /// Print the resolved preview URL of the item at the given index
    PreviewUrl {
        index: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("fotovault=info,fotovault_client=info,fotovault_api=info,fotovault_store=info,warn")
    });
    fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let db = match &config.data_dir {
        Some(dir) => Database::open_in(dir)?,
        None => Database::new()?,
    };

    let api = Arc::new(ApiClient::new(
        Url::parse(&config.server_url).context("invalid FOTOVAULT_SERVER_URL")?,
        Url::parse(&config.image_url).context("invalid FOTOVAULT_IMAGE_URL")?,
    )?);

    // Re-use the persisted session while it is still inside its validity
    // window.  An expired one is simply not injected; the next authenticated
    // call reports Unauthenticated.
    if db.is_logged_in()? {
        api.set_token(db.token()?);
    }

    let controller = AlbumController::new(api.clone());

    match cli.command {
        Commands::Register { username } => cmd_register(&db, &api, &username).await?,
        Commands::Login { username } => {
            let password = read_password()?;
            cmd_login(&db, &api, &username, &password).await?;
        }
        Commands::Logout => {
            db.logout()?;
            api.set_token(None);
            println!("Logged out");
        }
        Commands::Status => cmd_status(&db)?,
        Commands::List => cmd_list(&controller).await?,
        Commands::Upload { paths } => cmd_upload(&controller, paths).await?,
        Commands::Delete { filenames } => cmd_delete(&controller, filenames).await?,
        Commands::PreviewUrl { index } => cmd_preview_url(&controller, index).await?,
    }

    Ok(())
}

async fn cmd_register(db: &Database, api: &Arc<ApiClient>, username: &str) -> anyhow::Result<()> {
    let password = read_password()?;
    let message = api.register(username, &password).await?;
    println!("{message}");

    // Registering logs straight in with the same credentials.
    cmd_login(db, api, username, &password).await
}

async fn cmd_login(
    db: &Database,
    api: &Arc<ApiClient>,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let message = api.login(username, password).await?;
    if let Some(token) = api.token() {
        db.set_token(Some(token.as_str()))?;
    }
    println!("{message} (session valid for {} days)", db.remaining_days()?);
    Ok(())
}

fn cmd_status(db: &Database) -> anyhow::Result<()> {
    if db.is_logged_in()? {
        println!("Logged in, {} day(s) of session validity left", db.remaining_days()?);
    } else {
        println!("Not logged in");
    }
    Ok(())
}

async fn cmd_list(controller: &AlbumController<Arc<ApiClient>>) -> anyhow::Result<()> {
    let count = controller.refresh().await?;
    if count == 0 {
        println!("Album is empty");
        return Ok(());
    }

    for (index, file) in controller.files().iter().enumerate() {
        let uploaded = DateTime::<Utc>::from_timestamp(file.upload_time as i64, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{index:>3}  {:<40} {:>10} B  {uploaded}",
            file.filename, file.size
        );
    }
    Ok(())
}

async fn cmd_upload(
    controller: &AlbumController<Arc<ApiClient>>,
    paths: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut images = Vec::new();
    for path in &paths {
        match media::encode_for_upload(path) {
            Ok(bytes) => images.push(PendingUpload {
                bytes,
                source: path.display().to_string(),
            }),
            Err(e) => eprintln!("Skipping {}: {e}", path.display()),
        }
    }

    match controller.upload_batch(images).await {
        Some(report) => print_report(&report, "uploaded"),
        None => println!("Nothing to upload"),
    }
    Ok(())
}

async fn cmd_delete(
    controller: &AlbumController<Arc<ApiClient>>,
    filenames: Vec<String>,
) -> anyhow::Result<()> {
    controller.refresh().await?;
    let files = controller.files();

    let mut indices = Vec::new();
    for name in &filenames {
        match files
            .iter()
            .position(|f| f.filename == *name || f.preview_filename() == name)
        {
            Some(index) => indices.push(index),
            None => eprintln!("No such file: {name}"),
        }
    }

    let Some((&first, rest)) = indices.split_first() else {
        anyhow::bail!("nothing to delete");
    };
    controller.enter_selection(first);
    for &index in rest {
        controller.toggle_selected(index);
    }

    match controller.delete_selected().await {
        Some(report) => print_report(&report, "deleted"),
        None => println!("Nothing to delete"),
    }
    Ok(())
}

async fn cmd_preview_url(
    controller: &AlbumController<Arc<ApiClient>>,
    index: usize,
) -> anyhow::Result<()> {
    controller.refresh().await?;
    let urls = controller.preview_urls()?;
    match urls.get(index) {
        Some(url) => println!("{url}"),
        None => anyhow::bail!("index {index} out of range (album has {} items)", urls.len()),
    }
    Ok(())
}

fn print_report(report: &BatchReport, verb: &str) {
    if report.succeeded > 0 {
        println!("{} {verb}", report.succeeded);
    }
    if report.failed > 0 {
        println!("{} failed", report.failed);
        for (item, error) in &report.failures {
            eprintln!("  {item}: {error}");
        }
    }
}

/// Password from `FOTOVAULT_PASSWORD`, or an interactive prompt.
fn read_password() -> anyhow::Result<String> {
    if let Ok(password) = std::env::var("FOTOVAULT_PASSWORD") {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
