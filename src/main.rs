use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use userfeed::api::dummyjson::DummyJsonClient;
use userfeed::api::{UserSource, UserSummary};
use userfeed::app::App;
use userfeed::config::Config;
use userfeed::loader::{settle, LoadState, UserListLoader, UserPostLoader};

#[derive(Parser)]
#[command(name = "userfeed")]
#[command(about = "Browse the dummyjson demo users and their posts", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print users without starting the interactive UI
    Users {
        /// Number of pages to reveal
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Print a user's posts without starting the interactive UI
    Posts {
        user_id: u64,

        /// Number of pages to reveal
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    init_logging(cli.command.is_none())?;

    let source: Arc<dyn UserSource> = Arc::new(DummyJsonClient::new(
        &config.api.base_url,
        config.api.timeout(),
    ));

    match cli.command {
        None => {
            let mut app = App::new(config, source);
            app.run()
        }
        Some(Commands::Users { pages }) => print_users(&config, source, pages).await,
        Some(Commands::Posts { user_id, pages }) => {
            print_posts(&config, source, user_id, pages).await
        }
    }
}

/// The interactive UI owns the terminal, so its logs go to a file.
fn init_logging(to_file: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if to_file {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("userfeed");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = dir.join("userfeed.log");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

async fn print_users(config: &Config, source: Arc<dyn UserSource>, pages: usize) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut loader = UserListLoader::new(&config.users, source, tx);

    loader.load();
    if !settle(&mut loader, &mut rx).await {
        bail!("user loader stopped before finishing");
    }
    for _ in 1..pages {
        if !loader.has_more() {
            break;
        }
        loader.load_more();
        if !settle(&mut loader, &mut rx).await {
            bail!("user loader stopped before finishing");
        }
    }

    if let LoadState::Failed(message) = loader.state() {
        bail!("{}", message);
    }

    for user in loader.visible() {
        println!(
            "{:>4}  {:<24} {:<36} {}",
            user.id,
            user.full_name(),
            user.email,
            user.company.name
        );
    }
    println!("-- {} of {} users", loader.visible().len(), loader.total());
    Ok(())
}

async fn print_posts(
    config: &Config,
    source: Arc<dyn UserSource>,
    user_id: u64,
    pages: usize,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let user = UserSummary {
        id: user_id,
        first_name: String::new(),
        last_name: String::new(),
        image: String::new(),
    };
    let mut loader = UserPostLoader::new(1, user, &config.posts, source, tx);

    if !settle(&mut loader, &mut rx).await {
        bail!("post loader stopped before finishing");
    }
    for _ in 1..pages {
        loader.load_more();
    }

    if let LoadState::Failed(message) = loader.state() {
        bail!("{}", message);
    }
    if loader.is_empty_result() {
        println!("There are no posts to show");
        return Ok(());
    }

    for post in loader.visible() {
        println!("{:>4}  {}", post.id, post.title);
        if !post.tags.is_empty() {
            println!("      #{}", post.tags.join(", "));
        }
        println!(
            "      +{} -{} {} views",
            post.reactions.likes, post.reactions.dislikes, post.views
        );
    }
    println!("-- {} of {} posts", loader.visible().len(), loader.total());
    Ok(())
}
