use std::{num::ParseIntError, path::PathBuf};

use algobox_common::{
    config::{DEFAULT_WAIT_ROUNDS, VERSION},
    logger::{default_logs_datetime_format, LogLevel, LoggerSettings, ModuleConfig},
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::{
    boxes::BoxData,
    deploy::{DeployConfig, DEFAULT_APPROVAL_PATH, DEFAULT_APP_FUNDING, DEFAULT_CLEAR_PATH},
};

// node address by default when no specified
pub const DEFAULT_NODE_ADDRESS: &str = "http://127.0.0.1:4001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Functions Helpers
fn default_node_address() -> String {
    DEFAULT_NODE_ADDRESS.to_owned()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_approval_path() -> String {
    DEFAULT_APPROVAL_PATH.to_owned()
}

fn default_clear_path() -> String {
    DEFAULT_CLEAR_PATH.to_owned()
}

fn default_wait_rounds() -> u64 {
    DEFAULT_WAIT_ROUNDS
}

fn default_app_funding() -> u64 {
    DEFAULT_APP_FUNDING
}

fn default_log_filename() -> String {
    String::from("algobox-manager.log")
}

fn default_logs_path() -> String {
    String::from("logs/")
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Ledger node REST address
    #[clap(long, env = "ALGOD_ADDR", default_value_t = default_node_address())]
    #[serde(default = "default_node_address")]
    pub node_address: String,
    /// Node API token
    ///
    /// Either the raw token, a JSON string or a JSON object of header name to value.
    #[clap(long, env = "ALGOD_TOKEN", hide_env_values = true)]
    #[serde(default)]
    pub node_token: Option<String>,
    /// Timeout of a single request to the node, in seconds
    #[clap(long, default_value_t = default_request_timeout_secs())]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct AppConfig {
    /// Existing application to manage
    /// If not set, a new application is deployed first
    #[clap(long, env = "APP_ID")]
    #[serde(default)]
    pub app_id: Option<u64>,
    /// Approval program source
    #[clap(long, default_value_t = default_approval_path())]
    #[serde(default = "default_approval_path")]
    pub approval_path: String,
    /// Clear state program source
    #[clap(long, default_value_t = default_clear_path())]
    #[serde(default = "default_clear_path")]
    pub clear_path: String,
    /// Microunits sent to a newly deployed application
    #[clap(long, default_value_t = default_app_funding())]
    #[serde(default = "default_app_funding")]
    pub app_funding: u64,
    /// Rounds to wait for a transaction to be confirmed
    #[clap(long, default_value_t = default_wait_rounds())]
    #[serde(default = "default_wait_rounds")]
    pub wait_rounds: u64,
}

impl AppConfig {
    pub fn deploy_config(&self) -> DeployConfig {
        DeployConfig {
            approval_path: PathBuf::from(&self.approval_path),
            clear_path: PathBuf::from(&self.clear_path),
            funding: self.app_funding,
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Set log level
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Set file log level
    /// By default, it will be the same as log level
    #[clap(long, value_enum)]
    pub file_log_level: Option<LogLevel>,
    /// Disable the log file
    #[clap(long)]
    #[serde(default)]
    pub disable_file_logging: bool,
    /// Disable the log filename date based
    /// If disabled, the log file will be named algobox-manager.log instead of YYYY-MM-DD.algobox-manager.log
    #[clap(long)]
    #[serde(default)]
    pub disable_file_log_date_based: bool,
    /// Disable the usage of colors in log
    #[clap(long)]
    #[serde(default)]
    pub disable_log_color: bool,
    /// Log filename
    ///
    /// File will be stored in logs directory, this is only the filename, not the full path.
    #[clap(long, default_value_t = default_log_filename())]
    #[serde(default = "default_log_filename")]
    pub filename_log: String,
    /// Logs directory
    ///
    /// It must end with a / to be a valid folder.
    #[clap(long, default_value_t = default_logs_path())]
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    /// Module configuration for logs, as module=level
    #[clap(long)]
    #[serde(default)]
    pub logs_modules: Vec<ModuleConfig>,
    /// Change the datetime format used by the logger
    #[clap(long, default_value_t = default_logs_datetime_format())]
    #[serde(default = "default_logs_datetime_format")]
    pub datetime_format: String,
}

impl LogConfig {
    pub fn settings(&self) -> LoggerSettings<'_> {
        LoggerSettings {
            level: self.log_level,
            file_level: self.file_log_level,
            disable_file_logging: self.disable_file_logging,
            disable_file_log_date_based: self.disable_file_log_date_based,
            disable_colors: self.disable_log_color,
            filename: &self.filename_log,
            logs_path: &self.logs_path,
            modules: &self.logs_modules,
            datetime_format: &self.datetime_format,
        }
    }
}

/// Payload given on the command line.
#[derive(Debug, Clone, clap::Args)]
pub struct DataArg {
    /// Data to write
    pub data: String,
    /// Interpret the data as an unsigned integer stored on 8 bytes
    #[clap(long)]
    pub uint: bool,
}

impl DataArg {
    pub fn to_box_data(&self) -> Result<BoxData, ParseIntError> {
        if self.uint {
            Ok(BoxData::Uint(self.data.trim().parse()?))
        } else {
            Ok(BoxData::from(self.data.as_str()))
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Deploy a new application and print its id
    Deploy,
    /// List the boxes of the application
    Boxes,
    /// Show the content of a box
    Show { name: String },
    /// Show the decoded global state of the application
    State,
    /// Create an empty box of the given size
    Create { name: String, size: u64 },
    /// Create or overwrite a box with data
    Put {
        name: String,
        #[clap(flatten)]
        data: DataArg,
    },
    /// Delete a box
    Delete { name: String },
    /// Replace part of a box starting at an offset
    Replace {
        name: String,
        start: u64,
        #[clap(flatten)]
        data: DataArg,
    },
    /// Extract part of a box into the global state
    Extract {
        name: String,
        start: u64,
        length: u64,
    },
    /// Read a box into the global state
    Read { name: String },
    /// Store the length of a box in the global state
    Length { name: String },
}

#[derive(Parser, Serialize, Deserialize, Clone)]
#[clap(
    version = VERSION,
    about = "Manage the boxes of a ledger application from the command line"
)]
#[command(styles = algobox_common::get_cli_styles())]
pub struct Config {
    /// Node configuration
    #[clap(flatten)]
    pub node: NodeConfig,
    /// Application configuration
    #[clap(flatten)]
    pub app: AppConfig,
    /// Log configuration
    #[clap(flatten)]
    pub log: LogConfig,
    /// 25-word mnemonic of the signing account
    #[clap(long, env = "MASTER_MNEMONIC", hide_env_values = true)]
    #[serde(default)]
    pub mnemonic: Option<String>,
    /// JSON File to load the configuration from
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub config_file: Option<String>,
    /// Generate the template at the `config_file` path
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub generate_config_template: bool,
    /// Operation to run, lists the boxes by default
    #[command(subcommand)]
    #[serde(skip)]
    pub command: Option<Command>,
}
