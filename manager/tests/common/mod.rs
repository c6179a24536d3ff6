#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use algobox_common::{
    api::*,
    config::{BOX_REF_BYTES, MAX_TX_REFERENCES},
    crypto::{application_address, verify_signature, Address, KeyPair},
    transaction::{
        assign_group_id, decode_uint64, SignedTransaction, Transaction, TransactionType,
    },
};
use algobox_manager::{
    ledger_api::{BoxContent, LedgerClient, LedgerError},
    pipeline::SubmissionPipeline,
    provisioner::box_min_balance,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use indexmap::IndexMap;

pub const ACCOUNT_MIN_BALANCE: u64 = 100_000;
pub const MIN_FEE: u64 = 1000;
pub const GENESIS_ID: &str = "sandnet-v1";
pub const GENESIS_HASH: [u8; 32] = [7u8; 32];
pub const FIRST_APP_ID: u64 = 1001;
pub const MASTER_FUNDS: u64 = 100_000_000;

#[derive(Clone, Default)]
pub struct FakeApp {
    pub creator: Address,
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub global_uints: u64,
    pub global_byte_slices: u64,
    pub boxes: IndexMap<Vec<u8>, Vec<u8>>,
    pub global: IndexMap<String, TealValue>,
}

#[derive(Clone)]
struct LedgerState {
    round: u64,
    balances: HashMap<Address, u64>,
    min_balances: HashMap<Address, u64>,
    apps: HashMap<u64, FakeApp>,
    next_app_id: u64,
}

impl LedgerState {
    fn balance(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn min_balance(&self, address: &Address) -> u64 {
        self.min_balances
            .get(address)
            .copied()
            .unwrap_or(ACCOUNT_MIN_BALANCE)
    }

    fn debit(&mut self, address: &Address, amount: u64) -> Result<(), String> {
        let balance = self.balance(address);
        let remaining = balance
            .checked_sub(amount)
            .ok_or_else(|| format!("overspend: account {} balance {}", address, balance))?;
        self.balances.insert(*address, remaining);
        Ok(())
    }

    fn credit(&mut self, address: &Address, amount: u64) {
        *self.balances.entry(*address).or_insert(0) += amount;
    }

    fn check_min_balance(&self, address: &Address) -> Result<(), String> {
        let balance = self.balance(address);
        let min_balance = self.min_balance(address);
        if balance < min_balance {
            return Err(format!(
                "account {} balance {} below min {}",
                address, balance, min_balance
            ));
        }
        Ok(())
    }

    fn apply(&mut self, txn: &Transaction) -> Result<Option<u64>, String> {
        self.debit(&txn.sender, txn.fee)?;
        let created = match txn.tx_type {
            TransactionType::Payment => {
                let receiver = txn.receiver.ok_or("payment without receiver")?;
                self.debit(&txn.sender, txn.amount)?;
                self.credit(&receiver, txn.amount);
                None
            }
            TransactionType::ApplicationCall if txn.is_app_creation() => {
                let app_id = self.next_app_id;
                self.next_app_id += 1;
                let schema = txn.global_schema.unwrap_or_default();
                self.apps.insert(
                    app_id,
                    FakeApp {
                        creator: txn.sender,
                        approval_program: txn.approval_program.clone().unwrap_or_default(),
                        clear_program: txn.clear_program.clone().unwrap_or_default(),
                        global_uints: schema.num_uints,
                        global_byte_slices: schema.num_byte_slices,
                        ..Default::default()
                    },
                );
                Some(app_id)
            }
            TransactionType::ApplicationCall => {
                self.call(txn)?;
                None
            }
        };
        self.check_min_balance(&txn.sender)?;
        Ok(created)
    }

    // Storage contract: verb, box name, then verb-specific arguments
    fn call(&mut self, txn: &Transaction) -> Result<(), String> {
        let app_id = txn.app_id;
        let app_address = application_address(app_id);
        let references = txn.boxes.len()
            + txn.foreign_apps.len()
            + txn.foreign_assets.len()
            + txn.accounts.len();
        if references > MAX_TX_REFERENCES {
            return Err("too many foreign references".to_string());
        }

        let args: Vec<&[u8]> = txn.args().collect();
        let (verb, name) = match args.as_slice() {
            [verb, name, ..] => (*verb, name.to_vec()),
            _ => return Err("logic eval error: missing arguments".to_string()),
        };
        let named = txn
            .boxes
            .iter()
            .any(|reference| (reference.app_index == 0 || reference.app_index == app_id) && reference.name.as_slice() == name.as_slice());
        if !named {
            return Err("invalid Box reference".to_string());
        }
        let budget = txn.boxes.len() as u64 * BOX_REF_BYTES;

        let uint_arg = |index: usize| -> Result<u64, String> {
            args.get(index)
                .and_then(|arg| decode_uint64(arg))
                .ok_or_else(|| format!("logic eval error: argument {} is not a uint64", index))
        };
        let cost = |size: u64| box_min_balance(&name, size);

        let app = self
            .apps
            .get_mut(&app_id)
            .ok_or_else(|| format!("application {} does not exist", app_id))?;
        let mut min_balance_delta: i64 = 0;

        match verb {
            b"create_box" => {
                let size = uint_arg(2)?;
                if app.boxes.contains_key(&name) {
                    return Err("logic eval error: box already exists".to_string());
                }
                if size > budget {
                    return Err("box read/write budget exceeded".to_string());
                }
                app.boxes.insert(name.clone(), vec![0u8; size as usize]);
                min_balance_delta = cost(size) as i64;
            }
            b"box_put" => {
                let data = args.get(2).ok_or("logic eval error: missing data")?.to_vec();
                if data.len() as u64 > budget {
                    return Err("box read/write budget exceeded".to_string());
                }
                match app.boxes.get_mut(&name) {
                    Some(existing) if existing.len() != data.len() => {
                        return Err("logic eval error: box_put wrong size".to_string());
                    }
                    Some(existing) => *existing = data,
                    None => {
                        min_balance_delta = cost(data.len() as u64) as i64;
                        app.boxes.insert(name.clone(), data);
                    }
                }
            }
            b"box_delete" => {
                let existing = app
                    .boxes
                    .shift_remove(&name)
                    .ok_or("logic eval error: no such box")?;
                if existing.len() as u64 > budget {
                    return Err("box read/write budget exceeded".to_string());
                }
                min_balance_delta = -(cost(existing.len() as u64) as i64);
            }
            b"box_replace" => {
                let start = uint_arg(2)? as usize;
                let data = args.get(3).ok_or("logic eval error: missing data")?;
                let existing = app.boxes.get_mut(&name).ok_or("logic eval error: no such box")?;
                if existing.len() as u64 > budget {
                    return Err("box read/write budget exceeded".to_string());
                }
                if start + data.len() > existing.len() {
                    return Err("logic eval error: replacement out of bounds".to_string());
                }
                existing[start..start + data.len()].copy_from_slice(data);
            }
            b"box_extract" | b"box_read" | b"box_length" => {
                let existing = app.boxes.get(&name).ok_or("logic eval error: no such box")?;
                if existing.len() as u64 > budget {
                    return Err("box read/write budget exceeded".to_string());
                }
                let (key, value) = match verb {
                    b"box_extract" => {
                        let start = uint_arg(2)? as usize;
                        let length = uint_arg(3)? as usize;
                        if start + length > existing.len() {
                            return Err("logic eval error: extraction out of bounds".to_string());
                        }
                        ("extracted", bytes_value(&existing[start..start + length]))
                    }
                    b"box_read" => ("data", bytes_value(existing)),
                    _ => ("length", uint_value(existing.len() as u64)),
                };
                app.global.insert(key.to_string(), value);
            }
            _ => return Err("logic eval error: unknown verb".to_string()),
        }

        if min_balance_delta != 0 {
            let current = self.min_balance(&app_address) as i64;
            self.min_balances
                .insert(app_address, (current + min_balance_delta) as u64);
            self.check_min_balance(&app_address)?;
        }
        Ok(())
    }
}

fn bytes_value(bytes: &[u8]) -> TealValue {
    TealValue {
        value_type: TEAL_BYTES_TYPE,
        bytes: STANDARD.encode(bytes),
        uint: 0,
    }
}

fn uint_value(value: u64) -> TealValue {
    TealValue {
        value_type: TEAL_UINT_TYPE,
        bytes: String::new(),
        uint: value,
    }
}

/// In-memory ledger node running the box storage contract.
pub struct FakeLedger {
    state: Mutex<LedgerState>,
    pending: Mutex<HashMap<String, PendingTransactionResponse>>,
    submitted: Mutex<Vec<SignedTransaction>>,
    never_confirm: Mutex<bool>,
    pool_error: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl FakeLedger {
    pub fn new(funded: &Address) -> Self {
        let mut balances = HashMap::new();
        balances.insert(*funded, MASTER_FUNDS);
        Self {
            state: Mutex::new(LedgerState {
                round: 100,
                balances,
                min_balances: HashMap::new(),
                apps: HashMap::new(),
                next_app_id: FIRST_APP_ID,
            }),
            pending: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            never_confirm: Mutex::new(false),
            pool_error: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_never_confirm(&self, value: bool) {
        *self.never_confirm.lock().unwrap() = value;
    }

    pub fn set_pool_error(&self, error: Option<&str>) {
        *self.pool_error.lock().unwrap() = error.map(str::to_owned);
    }

    /// Create an application directly, without going through a transaction.
    pub fn seed_app(&self, creator: &Address, funding: u64) -> u64 {
        let mut state = self.state.lock().unwrap();
        let app_id = state.next_app_id;
        state.next_app_id += 1;
        state.apps.insert(
            app_id,
            FakeApp {
                creator: *creator,
                global_uints: 1,
                global_byte_slices: 2,
                ..Default::default()
            },
        );
        state.credit(&application_address(app_id), funding);
        app_id
    }

    pub fn app(&self, app_id: u64) -> Option<FakeApp> {
        self.state.lock().unwrap().apps.get(&app_id).cloned()
    }

    pub fn balance(&self, address: &Address) -> u64 {
        self.state.lock().unwrap().balance(address)
    }

    pub fn min_balance(&self, address: &Address) -> u64 {
        self.state.lock().unwrap().min_balance(address)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn payments_to(&self, receiver: &Address) -> Vec<u64> {
        self.submitted()
            .iter()
            .filter(|signed| signed.txn.receiver.as_ref() == Some(receiver))
            .map(|signed| signed.txn.amount)
            .collect()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn verify(&self, signed: &SignedTransaction, round: u64) -> Result<(), String> {
        let txn = &signed.txn;
        let message = txn.bytes_to_sign().map_err(|e| e.to_string())?;
        verify_signature(&txn.sender, &message, &signed.sig)
            .map_err(|_| "invalid signature".to_string())?;
        if txn.genesis_hash.as_slice() != GENESIS_HASH || txn.genesis_id != GENESIS_ID {
            return Err("wrong genesis".to_string());
        }
        if txn.first_valid > round + 1 || txn.last_valid < round + 1 {
            return Err("txn dead".to_string());
        }
        if txn.fee < MIN_FEE {
            return Err("fee too small".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn compile_program(&self, source: &[u8]) -> Result<CompileResponse, LedgerError> {
        self.hit();
        let mut program = vec![0x08];
        program.extend_from_slice(source);
        Ok(CompileResponse {
            hash: "COMPILED".to_string(),
            result: STANDARD.encode(program),
        })
    }

    async fn suggested_params(&self) -> Result<TransactionParams, LedgerError> {
        self.hit();
        let round = self.state.lock().unwrap().round;
        Ok(TransactionParams {
            consensus_version: "future".to_string(),
            fee: 0,
            genesis_hash: STANDARD.encode(GENESIS_HASH),
            genesis_id: GENESIS_ID.to_string(),
            last_round: round,
            min_fee: MIN_FEE,
        })
    }

    async fn submit_raw_group(&self, group: &[Vec<u8>]) -> Result<String, LedgerError> {
        self.hit();
        let signed = group
            .iter()
            .map(|raw| SignedTransaction::from_msgpack(raw))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LedgerError::Rejected(e.to_string()))?;
        let first = signed.first().ok_or(LedgerError::Rejected("empty group".to_string()))?;
        let first_id = first
            .id()
            .map_err(|e| LedgerError::Rejected(e.to_string()))?;

        let mut state = self.state.lock().unwrap();
        for member in &signed {
            self.verify(member, state.round).map_err(LedgerError::Rejected)?;
        }
        if signed.len() > 1 {
            let mut txns: Vec<Transaction> = signed.iter().map(|s| s.txn.clone()).collect();
            let expected = assign_group_id(&mut txns)
                .map_err(|e| LedgerError::Rejected(e.to_string()))?
                .map(|group| group.as_bytes().to_vec());
            if signed.iter().any(|s| s.txn.group != expected) {
                return Err(LedgerError::Rejected("incomplete group".to_string()));
            }
        }
        self.submitted.lock().unwrap().extend(signed.iter().cloned());

        let pool_error = self.pool_error.lock().unwrap().clone();
        let never_confirm = *self.never_confirm.lock().unwrap();
        let mut records = Vec::with_capacity(signed.len());
        if pool_error.is_some() || never_confirm {
            for member in &signed {
                records.push((member, PendingTransactionResponse {
                    pool_error: pool_error.clone().unwrap_or_default(),
                    ..Default::default()
                }));
            }
        } else {
            // all members apply or none do
            let mut next = state.clone();
            next.round += 1;
            let mut created = Vec::with_capacity(signed.len());
            for member in &signed {
                created.push(next.apply(&member.txn).map_err(LedgerError::Rejected)?);
            }
            *state = next;
            for (member, app_id) in signed.iter().zip(created) {
                records.push((member, PendingTransactionResponse {
                    confirmed_round: Some(state.round),
                    application_index: app_id,
                    txn: serde_json::json!({
                        "sig": STANDARD.encode(&member.sig),
                        "txn": &member.txn,
                    }),
                    ..Default::default()
                }));
            }
        }

        let mut pending = self.pending.lock().unwrap();
        for (member, record) in records {
            let id = member
                .id()
                .map_err(|e| LedgerError::Rejected(e.to_string()))?;
            pending.insert(id, record);
        }
        Ok(first_id)
    }

    async fn status(&self) -> Result<NodeStatus, LedgerError> {
        self.hit();
        Ok(NodeStatus {
            last_round: self.state.lock().unwrap().round,
            ..Default::default()
        })
    }

    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, LedgerError> {
        self.hit();
        let mut state = self.state.lock().unwrap();
        state.round = state.round.max(round + 1);
        Ok(NodeStatus {
            last_round: state.round,
            ..Default::default()
        })
    }

    async fn pending_transaction(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionResponse, LedgerError> {
        self.hit();
        self.pending
            .lock()
            .unwrap()
            .get(tx_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", tx_id)))
    }

    async fn account_information(
        &self,
        address: &Address,
    ) -> Result<AccountInformation, LedgerError> {
        self.hit();
        let state = self.state.lock().unwrap();
        Ok(AccountInformation {
            address: address.to_string(),
            amount: state.balance(address),
            min_balance: state.min_balance(address),
            round: state.round,
            ..Default::default()
        })
    }

    async fn application_global_state(
        &self,
        app_id: u64,
    ) -> Result<Vec<TealKeyValue>, LedgerError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let app = state
            .apps
            .get(&app_id)
            .ok_or_else(|| LedgerError::NotFound(format!("application {}", app_id)))?;
        Ok(app
            .global
            .iter()
            .map(|(key, value)| TealKeyValue {
                key: STANDARD.encode(key),
                value: value.clone(),
            })
            .collect())
    }

    async fn box_by_name(&self, app_id: u64, name: &[u8]) -> Result<BoxContent, LedgerError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let app = state
            .apps
            .get(&app_id)
            .ok_or_else(|| LedgerError::NotFound(format!("application {}", app_id)))?;
        let value = app
            .boxes
            .get(name)
            .ok_or_else(|| LedgerError::NotFound(format!("box {}", String::from_utf8_lossy(name))))?;
        Ok(BoxContent {
            name: name.to_vec(),
            value: value.clone(),
        })
    }

    async fn box_names(&self, app_id: u64) -> Result<Vec<Vec<u8>>, LedgerError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let app = state
            .apps
            .get(&app_id)
            .ok_or_else(|| LedgerError::NotFound(format!("application {}", app_id)))?;
        Ok(app.boxes.keys().cloned().collect())
    }
}

/// A funded signer and a ledger that knows about it.
pub fn setup() -> (Arc<FakeLedger>, Arc<KeyPair>, Arc<SubmissionPipeline>) {
    let keypair = Arc::new(KeyPair::generate());
    let ledger = Arc::new(FakeLedger::new(&keypair.address()));
    let pipeline = Arc::new(SubmissionPipeline::new(ledger.clone(), keypair.clone()));
    (ledger, keypair, pipeline)
}
