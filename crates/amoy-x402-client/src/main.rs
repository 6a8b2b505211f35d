use clap::Parser;
use reqwest::Method;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use x402_client::{ClientConfig, LocalWalletSigner, PaymentInterceptor, ReqwestTransport, X402Error};

/// Fetch a URL, paying any x402 challenge with a local wallet.
#[derive(Parser, Debug)]
#[command(name = "x402-fetch", version, about, long_about = None)]
struct Cli {
    /// Resource to fetch
    url: String,

    /// HTTP method
    #[arg(default_value = "GET")]
    method: String,

    /// Hex private key of the paying wallet
    #[arg(long, env = "EVM_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), X402Error> {
    let method = Method::from_bytes(cli.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| X402Error::ConfigError(format!("invalid HTTP method {:?}", cli.method)))?;

    let signer = LocalWalletSigner::from_private_key(&cli.private_key)?;
    let config = ClientConfig::from_env()?;

    tracing::info!(
        wallet = %signer.account(),
        scheme = %config.chain.scheme_name,
        network = %config.chain.network,
        "x402-fetch"
    );

    let client = PaymentInterceptor::new(ReqwestTransport::new()?, signer, config);
    let resp = client.fetch(method, &cli.url).await?;

    println!("{}", resp.status);
    println!("{}", resp.text());
    Ok(())
}
