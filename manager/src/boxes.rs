//! Box storage verbs invoked through application calls.

use std::sync::Arc;

use algobox_common::{
    api::PendingTransactionResponse,
    config::{MAX_APP_ARGS, MAX_APP_TOTAL_ARG_LEN, MAX_TX_REFERENCES},
    crypto::{application_address, Address},
    state::{decode_global_state, GlobalState},
    transaction::{
        builder::{AppCallConfig, TransactionBuilder},
        encode_uint64,
    },
};
use log::{debug, info};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::{
    error::{BoxError, ValidationError},
    ledger_api::BoxContent,
    pipeline::SubmissionPipeline,
    provisioner::BalanceProvisioner,
    slots::{box_references, validate_box_name},
};

/// Verb tag sent as the first application argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BoxVerb {
    CreateBox,
    BoxPut,
    BoxDelete,
    BoxReplace,
    BoxExtract,
    BoxRead,
    BoxLength,
}

impl BoxVerb {
    pub fn tag(&self) -> Vec<u8> {
        self.as_ref().as_bytes().to_vec()
    }
}

/// Payload written to a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxData {
    // 8-byte big-endian
    Uint(u64),
    Bytes(Vec<u8>),
}

impl BoxData {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Uint(value) => encode_uint64(*value).to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            Self::Uint(_) => 8,
            Self::Bytes(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<u64> for BoxData {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<&str> for BoxData {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for BoxData {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

// Strict bounds: a range reaching the end of the box is refused
pub fn check_replace_bounds(box_len: u64, start: u64, data_len: u64) -> Result<(), ValidationError> {
    if data_len >= box_len {
        return Err(ValidationError::DataTooLong {
            len: data_len,
            box_len,
        });
    }
    if start >= box_len {
        return Err(ValidationError::StartOutOfRange { start, box_len });
    }
    Ok(())
}

pub fn check_extract_bounds(box_len: u64, start: u64, length: u64) -> Result<(), ValidationError> {
    if length >= box_len {
        return Err(ValidationError::ExtractTooLong {
            len: length,
            box_len,
        });
    }
    if start >= box_len {
        return Err(ValidationError::StartOutOfRange { start, box_len });
    }
    Ok(())
}

/// Checks the per-transaction limits of an application call.
pub fn validate_call(config: &AppCallConfig) -> Result<(), ValidationError> {
    if config.args.len() > MAX_APP_ARGS {
        return Err(ValidationError::TooManyArgs {
            count: config.args.len(),
            max: MAX_APP_ARGS,
        });
    }
    let args_len = config.total_args_len();
    if args_len > MAX_APP_TOTAL_ARG_LEN {
        return Err(ValidationError::ArgsTooLarge {
            len: args_len,
            max: MAX_APP_TOTAL_ARG_LEN,
        });
    }
    let references = config.total_references();
    if references > MAX_TX_REFERENCES {
        return Err(ValidationError::TooManyReferences {
            count: references,
            max: MAX_TX_REFERENCES,
        });
    }
    Ok(())
}

/// Box operations of a single application.
pub struct BoxManager {
    app_id: u64,
    pipeline: Arc<SubmissionPipeline>,
    provisioner: BalanceProvisioner,
}

impl BoxManager {
    pub fn new(app_id: u64, pipeline: Arc<SubmissionPipeline>) -> Self {
        Self {
            app_id,
            provisioner: BalanceProvisioner::new(pipeline.clone()),
            pipeline,
        }
    }

    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    pub fn app_address(&self) -> Address {
        application_address(self.app_id)
    }

    pub fn provisioner(&self) -> &BalanceProvisioner {
        &self.provisioner
    }

    // Assemble the call locally, nothing is sent yet
    fn prepare(
        &self,
        verb: BoxVerb,
        name: &[u8],
        payload: Vec<Vec<u8>>,
        size: u64,
    ) -> Result<AppCallConfig, ValidationError> {
        let boxes = box_references(name, size)?;
        let mut args = Vec::with_capacity(payload.len() + 2);
        args.push(verb.tag());
        args.push(name.to_vec());
        args.extend(payload);

        let config = AppCallConfig::new(self.app_id)
            .with_args(args)
            .with_boxes(boxes);
        validate_call(&config)?;
        Ok(config)
    }

    async fn submit(&self, config: AppCallConfig) -> Result<PendingTransactionResponse, BoxError> {
        let params = self.pipeline.suggested_params().await?;
        let txn =
            TransactionBuilder::new(self.pipeline.sender(), &params).application_call(config)?;
        self.pipeline.sign_and_submit(vec![txn]).await
    }

    async fn current_len(&self, name: &[u8]) -> Result<u64, BoxError> {
        validate_box_name(name)?;
        Ok(self.get_box(name).await?.len())
    }

    /// Create an empty box of `size` bytes, funding the application first.
    pub async fn create_box(&self, name: &[u8], size: u64) -> Result<BoxContent, BoxError> {
        let config = self.prepare(
            BoxVerb::CreateBox,
            name,
            vec![encode_uint64(size).to_vec()],
            size,
        )?;
        self.provisioner
            .ensure_box_funding(&self.app_address(), name, size)
            .await?;
        self.submit(config).await?;

        let content = self.get_box(name).await?;
        info!("{}", describe_box(&content));
        Ok(content)
    }

    /// Create or overwrite a box with `data`, funding the application first.
    pub async fn put_box(&self, name: &[u8], data: &BoxData) -> Result<BoxContent, BoxError> {
        let bytes = data.to_bytes();
        let size = bytes.len() as u64;
        let config = self.prepare(BoxVerb::BoxPut, name, vec![bytes], size)?;
        self.provisioner
            .ensure_box_funding(&self.app_address(), name, size)
            .await?;
        self.submit(config).await?;

        let content = self.get_box(name).await?;
        info!("{}", describe_box(&content));
        Ok(content)
    }

    /// Delete a box and return the names of the remaining boxes.
    pub async fn delete_box(&self, name: &[u8]) -> Result<Vec<String>, BoxError> {
        let box_len = self.current_len(name).await?;
        let config = self.prepare(BoxVerb::BoxDelete, name, Vec::new(), box_len)?;
        self.submit(config).await?;

        let names = self.box_names().await?;
        info!("app boxes: {:?}", names);
        Ok(names)
    }

    /// Overwrite `data.len()` bytes of a box starting at `start`.
    pub async fn replace_box_range(
        &self,
        name: &[u8],
        start: u64,
        data: &BoxData,
    ) -> Result<BoxContent, BoxError> {
        let bytes = data.to_bytes();
        let box_len = self.current_len(name).await?;
        check_replace_bounds(box_len, start, bytes.len() as u64)?;

        let config = self.prepare(
            BoxVerb::BoxReplace,
            name,
            vec![encode_uint64(start).to_vec(), bytes],
            box_len,
        )?;
        self.submit(config).await?;

        let content = self.get_box(name).await?;
        info!("{}", describe_box(&content));
        Ok(content)
    }

    /// Have the application extract a range of the box into its global state.
    pub async fn extract_box_range(
        &self,
        name: &[u8],
        start: u64,
        length: u64,
    ) -> Result<GlobalState, BoxError> {
        let box_len = self.current_len(name).await?;
        check_extract_bounds(box_len, start, length)?;

        let config = self.prepare(
            BoxVerb::BoxExtract,
            name,
            vec![encode_uint64(start).to_vec(), encode_uint64(length).to_vec()],
            box_len,
        )?;
        self.submit(config).await?;
        self.report_global_state().await
    }

    /// Have the application copy the whole box into its global state.
    pub async fn read_box(&self, name: &[u8]) -> Result<GlobalState, BoxError> {
        let box_len = self.current_len(name).await?;
        let config = self.prepare(BoxVerb::BoxRead, name, Vec::new(), box_len)?;
        self.submit(config).await?;
        self.report_global_state().await
    }

    /// Have the application store the box length in its global state.
    pub async fn box_length(&self, name: &[u8]) -> Result<GlobalState, BoxError> {
        let box_len = self.current_len(name).await?;
        let config = self.prepare(BoxVerb::BoxLength, name, Vec::new(), box_len)?;
        self.submit(config).await?;
        self.report_global_state().await
    }

    pub async fn get_box(&self, name: &[u8]) -> Result<BoxContent, BoxError> {
        Ok(self
            .pipeline
            .ledger()
            .box_by_name(self.app_id, name)
            .await?)
    }

    pub async fn box_names(&self) -> Result<Vec<String>, BoxError> {
        let names = self.pipeline.ledger().box_names(self.app_id).await?;
        Ok(names
            .iter()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect())
    }

    pub async fn global_state(&self) -> Result<GlobalState, BoxError> {
        let entries = self
            .pipeline
            .ledger()
            .application_global_state(self.app_id)
            .await?;
        if log::log_enabled!(log::Level::Debug) {
            debug!("{} raw global state entries", entries.len());
        }
        Ok(decode_global_state(&entries)?)
    }

    async fn report_global_state(&self) -> Result<GlobalState, BoxError> {
        let state = self.global_state().await?;
        info!("global state: {}", describe_state(&state));
        Ok(state)
    }
}

pub fn describe_box(content: &BoxContent) -> String {
    format!(
        "box {} ({} bytes): {}",
        content.name_lossy(),
        content.len(),
        String::from_utf8_lossy(&content.value)
    )
}

pub fn describe_state(state: &GlobalState) -> String {
    let entries: Vec<String> = state
        .iter()
        .map(|(key, value)| format!("{} => {}", key, value))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_verb_tags() {
        assert_eq!(BoxVerb::CreateBox.as_ref(), "create_box");
        assert_eq!(BoxVerb::BoxPut.tag(), b"box_put".to_vec());
        assert_eq!(BoxVerb::BoxDelete.to_string(), "box_delete");
        assert_eq!(BoxVerb::from_str("box_extract").unwrap(), BoxVerb::BoxExtract);
        let tag: &'static str = BoxVerb::BoxLength.into();
        assert_eq!(tag, "box_length");
    }

    #[test]
    fn test_box_data_encoding() {
        assert_eq!(BoxData::from(1u64).to_bytes(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(BoxData::from("AB").to_bytes(), b"AB".to_vec());
        assert_eq!(BoxData::Uint(u64::MAX).len(), 8);
        assert!(BoxData::from(Vec::new()).is_empty());
    }

    #[test]
    fn test_replace_bounds_are_strict() {
        assert!(check_replace_bounds(100, 0, 99).is_ok());
        assert_eq!(
            check_replace_bounds(100, 0, 100),
            Err(ValidationError::DataTooLong {
                len: 100,
                box_len: 100
            })
        );
        assert_eq!(
            check_replace_bounds(100, 100, 1),
            Err(ValidationError::StartOutOfRange {
                start: 100,
                box_len: 100
            })
        );
    }

    #[test]
    fn test_extract_bounds_are_strict() {
        assert!(check_extract_bounds(100, 4, 5).is_ok());
        assert!(check_extract_bounds(100, 99, 1).is_ok());
        assert!(matches!(
            check_extract_bounds(100, 100, 1),
            Err(ValidationError::StartOutOfRange { .. })
        ));
        assert!(matches!(
            check_extract_bounds(100, 0, 100),
            Err(ValidationError::ExtractTooLong { .. })
        ));
    }

    #[test]
    fn test_length_checked_before_start() {
        assert!(matches!(
            check_replace_bounds(10, 50, 20),
            Err(ValidationError::DataTooLong { .. })
        ));
    }

    #[test]
    fn test_call_limits() {
        let too_many_args = AppCallConfig::new(1).with_args(vec![vec![1u8]; 17]);
        assert!(matches!(
            validate_call(&too_many_args),
            Err(ValidationError::TooManyArgs { count: 17, .. })
        ));

        let too_large = AppCallConfig::new(1).with_args(vec![vec![0u8; 1025], vec![0u8; 1024]]);
        assert!(matches!(
            validate_call(&too_large),
            Err(ValidationError::ArgsTooLarge { len: 2049, .. })
        ));

        let mut too_many_refs = AppCallConfig::new(1).with_boxes(box_references(b"b", 8192).unwrap());
        too_many_refs.foreign_apps.push(3);
        assert!(matches!(
            validate_call(&too_many_refs),
            Err(ValidationError::TooManyReferences { count: 9, .. })
        ));
    }
}
