use std::{fs::File, io::Write, path::Path, sync::Arc, time::Duration};

use algobox_common::{crypto::mnemonic::keypair_from_mnemonic, logger::setup_logger};
use algobox_manager::{
    boxes::{describe_box, describe_state, BoxManager},
    config::{Command, Config},
    deploy::ApplicationDeployer,
    ledger_api::AlgodAPI,
    pipeline::SubmissionPipeline,
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config: Config = Config::parse();
    if let Some(path) = config.config_file.as_ref() {
        if config.generate_config_template {
            if Path::new(path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let mut file = File::create(path).context("Error while creating config file")?;
            let json = serde_json::to_string_pretty(&config)
                .context("Error while serializing config file")?;
            file.write_all(json.as_bytes())
                .context("Error while writing config file")?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        // the subcommand is never part of the file
        let command = config.command.take();
        let file = File::open(path).context("Error while opening config file")?;
        config = serde_json::from_reader(file).context("Error while reading config file")?;
        config.command = command;
    } else if config.generate_config_template {
        eprintln!(
            "Provided config file path is required to generate the template with --config-file"
        );
        return Ok(());
    }

    setup_logger(config.log.settings()).context("Error while setting up the logger")?;

    // fail fast: stop at the first error
    if let Err(e) = run(config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let mnemonic = config
        .mnemonic
        .as_deref()
        .context("No signing account, use --mnemonic or MASTER_MNEMONIC")?;
    let keypair = keypair_from_mnemonic(mnemonic).context("Invalid signing mnemonic")?;
    info!("Using account {}", keypair.address());

    let ledger = AlgodAPI::with_timeout(
        &config.node.node_address,
        config.node.node_token.as_deref().unwrap_or_default(),
        Duration::from_secs(config.node.request_timeout_secs),
    )
    .context("Error while creating the node client")?;
    let pipeline = Arc::new(
        SubmissionPipeline::new(Arc::new(ledger), Arc::new(keypair))
            .with_wait_rounds(config.app.wait_rounds),
    );

    let deployer = ApplicationDeployer::new(pipeline.clone());
    let deploy_config = config.app.deploy_config();
    let command = config.command.unwrap_or(Command::Boxes);

    if let Command::Deploy = command {
        let app_id = deployer
            .deploy(&deploy_config)
            .await
            .context("Error while deploying the application")?;
        println!("{}", app_id);
        return Ok(());
    }

    let app_id = match config.app.app_id {
        Some(app_id) => app_id,
        None => deployer
            .deploy(&deploy_config)
            .await
            .context("Error while deploying the application")?,
    };
    let manager = BoxManager::new(app_id, pipeline);
    info!("Application {} at {}", app_id, manager.app_address());

    match command {
        Command::Deploy => {}
        Command::Boxes => {
            let names = manager.box_names().await.context("Error while listing boxes")?;
            info!("app boxes: {:?}", names);
        }
        Command::Show { name } => {
            let content = manager
                .get_box(name.as_bytes())
                .await
                .with_context(|| format!("Error while reading box {}", name))?;
            info!("{}", describe_box(&content));
            info!("hex: {}", hex::encode(&content.value));
        }
        Command::State => {
            let state = manager
                .global_state()
                .await
                .context("Error while reading global state")?;
            info!("global state: {}", describe_state(&state));
        }
        Command::Create { name, size } => {
            manager
                .create_box(name.as_bytes(), size)
                .await
                .with_context(|| format!("Error while creating box {}", name))?;
        }
        Command::Put { name, data } => {
            let data = data.to_box_data().context("Invalid integer data")?;
            manager
                .put_box(name.as_bytes(), &data)
                .await
                .with_context(|| format!("Error while writing box {}", name))?;
        }
        Command::Delete { name } => {
            manager
                .delete_box(name.as_bytes())
                .await
                .with_context(|| format!("Error while deleting box {}", name))?;
        }
        Command::Replace { name, start, data } => {
            let data = data.to_box_data().context("Invalid integer data")?;
            manager
                .replace_box_range(name.as_bytes(), start, &data)
                .await
                .with_context(|| format!("Error while replacing data in box {}", name))?;
        }
        Command::Extract {
            name,
            start,
            length,
        } => {
            manager
                .extract_box_range(name.as_bytes(), start, length)
                .await
                .with_context(|| format!("Error while extracting data from box {}", name))?;
        }
        Command::Read { name } => {
            manager
                .read_box(name.as_bytes())
                .await
                .with_context(|| format!("Error while reading box {}", name))?;
        }
        Command::Length { name } => {
            manager
                .box_length(name.as_bytes())
                .await
                .with_context(|| format!("Error while reading length of box {}", name))?;
        }
    }

    Ok(())
}
