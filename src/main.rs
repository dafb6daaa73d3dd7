use anyhow::Result;
use clap::Parser;
use deploy_alert::config::Config;
use deploy_alert::explorer::BasescanClient;
use deploy_alert::notifier::{LogNotifier, Notifier, TelegramNotifier};
use deploy_alert::poller::Poller;
use deploy_alert::rpc::RpcClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deploy-alert")]
#[command(about = "Watch a wallet for deployToken calls and alert on Telegram", long_about = None)]
struct Cli {
    /// Run a single poll iteration and exit
    #[arg(long)]
    once: bool,

    /// Log messages instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("Starting deployToken watcher");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded");
    info!("Wallet address: {:?}", config.wallet_address);

    let client = match RpcClient::new(&config.rpc_url) {
        Ok(client) => client,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("RPC client configured for {}", client.url());

    let source = BasescanClient::new(
        config.explorer_api_url.clone(),
        config.wallet_address,
        config.explorer_api_key.clone(),
    );

    if cli.dry_run {
        info!("Dry run enabled, alerts are only logged");
        run(cli.once, &config, source, client, LogNotifier).await
    } else {
        let notifier = TelegramNotifier::new(&config.telegram_bot_token);
        run(cli.once, &config, source, client, notifier).await
    }
}

async fn run<N: Notifier>(
    once: bool,
    config: &Config,
    source: BasescanClient,
    client: RpcClient,
    notifier: N,
) -> Result<()> {
    let mut poller = Poller::new(source, client, notifier, config.classifier())
        .with_poll_interval(config.poll_interval)
        .with_explorer_web_url(config.explorer_web_url.clone());

    let result = if once {
        poller.tick().await.map(|tick| info!("Single iteration finished: {:?}", tick))
    } else {
        match poller.run().await {
            Ok(never) => match never {},
            Err(e) => Err(e),
        }
    };

    if let Err(e) = result {
        error!("{}. Stopping.", e);
        std::process::exit(1);
    }

    Ok(())
}
