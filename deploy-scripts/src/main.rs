use clap::Parser;
use deploy_scripts::{
    backends::{SeidBackend, SeidConfig},
    cli::Cli,
    commands::{run, DeployConfig},
    errors::ScriptError,
    utils::optional_env_file,
};
use provisioner::ProcessEnv;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    tracing_subscriber::fmt().pretty().init();

    if let Err(e) = optional_env_file(dotenvy::dotenv()) {
        warn!("could not load .env: {e}");
    }
    let cli = Cli::parse();

    let binary = cli.seid_binary.clone();
    let gas_prices = cli.gas_prices.clone();
    let connect = |config: DeployConfig| async move {
        SeidBackend::connect(
            SeidConfig {
                binary: &binary,
                node: &config.rpc_endpoint,
                chain_id: &config.chain_id,
                gas_prices: &gas_prices,
            },
            &config.mnemonic,
        )
        .await
    };

    run(&cli, &ProcessEnv, connect).await.map(|_| ()).map_err(|e| {
        error!("{e}");
        e
    })
}
