use blogforge_rs::forge::agent::BlogAgent;
use blogforge_rs::forge::config::Settings;
use blogforge_rs::forge::server;
use blogforge_rs::forge::session::{Session, DEFAULT_LANGUAGE};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the blog generation API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Generate a single blog and print it as markdown
    Generate {
        /// Topic of the blog
        #[arg(short, long)]
        topic: String,

        /// Target language code
        #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
        language: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let settings = Settings::from_env()?;
    log::info!(
        "Using model: {} from provider: {}",
        settings.model_name,
        settings.model_provider
    );

    let session = Arc::new(Session::new(settings));
    let agent = Arc::new(BlogAgent::from_session(session)?);

    match args.command {
        Commands::Serve { host, port } => {
            server::serve(agent, SocketAddr::new(host, port)).await?;
        }
        Commands::Generate { topic, language } => {
            let blog = agent.generate(&topic, &language).await?;
            println!("{}", blog.to_markdown());
        }
    }

    Ok(())
}
