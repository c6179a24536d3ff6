use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use algobox_common::{
    crypto::application_address,
    transaction::{
        builder::{AppCreateConfig, TransactionBuilder},
        StateSchema,
    },
};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, info};

use crate::{
    error::BoxError,
    ledger_api::LedgerError,
    pipeline::SubmissionPipeline,
    provisioner::BalanceProvisioner,
};

pub const DEFAULT_APPROVAL_PATH: &str = "artifacts/sc_approval.teal";
pub const DEFAULT_CLEAR_PATH: &str = "artifacts/sc_clearstate.teal";
// Initial funding of a new application account, in microunits
pub const DEFAULT_APP_FUNDING: u64 = 100_000;

// One uint for the box length, two byte slices for box and extracted data
pub const GLOBAL_UINTS: u64 = 1;
pub const GLOBAL_BYTE_SLICES: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub approval_path: PathBuf,
    pub clear_path: PathBuf,
    pub funding: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            approval_path: PathBuf::from(DEFAULT_APPROVAL_PATH),
            clear_path: PathBuf::from(DEFAULT_CLEAR_PATH),
            funding: DEFAULT_APP_FUNDING,
        }
    }
}

/// Creates and funds the storage application.
pub struct ApplicationDeployer {
    pipeline: Arc<SubmissionPipeline>,
    provisioner: BalanceProvisioner,
}

impl ApplicationDeployer {
    pub fn new(pipeline: Arc<SubmissionPipeline>) -> Self {
        Self {
            provisioner: BalanceProvisioner::new(pipeline.clone()),
            pipeline,
        }
    }

    /// Read a program source and compile it with the node.
    pub async fn compile_artifact(&self, path: &Path) -> Result<Vec<u8>, BoxError> {
        let source = fs::read(path).map_err(|source| BoxError::Artifact {
            path: path.display().to_string(),
            source,
        })?;

        let compiled = self.pipeline.ledger().compile_program(&source).await?;
        if log::log_enabled!(log::Level::Debug) {
            debug!("compiled {} with hash {}", path.display(), compiled.hash);
        }

        let program = STANDARD
            .decode(compiled.result.as_bytes())
            .map_err(|e| LedgerError::Decode(format!("compiled program: {}", e)))?;
        Ok(program)
    }

    /// Create the application, fund its account and return its id.
    pub async fn deploy(&self, config: &DeployConfig) -> Result<u64, BoxError> {
        let approval_program = self.compile_artifact(&config.approval_path).await?;
        let clear_program = self.compile_artifact(&config.clear_path).await?;

        let params = self.pipeline.suggested_params().await?;
        let txn = TransactionBuilder::new(self.pipeline.sender(), &params).application_create(
            AppCreateConfig {
                approval_program,
                clear_program,
                global_schema: StateSchema::new(GLOBAL_UINTS, GLOBAL_BYTE_SLICES),
                ..Default::default()
            },
        )?;
        let tx_id = txn.id()?;

        let record = self.pipeline.sign_and_submit(vec![txn]).await?;
        let app_id = record
            .application_index
            .filter(|id| *id > 0)
            .ok_or(BoxError::MissingApplicationIndex(tx_id))?;
        info!("App ID: {}", app_id);

        if config.funding > 0 {
            self.provisioner
                .transfer(application_address(app_id), config.funding)
                .await?;
        }

        Ok(app_id)
    }
}
