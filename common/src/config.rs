pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 1 unit = 1_000_000 microunits
pub const MICRO_UNITS: u64 = 1_000_000;
pub const UNIT_DECIMALS: u8 = 6;

// Box storage rules
// A box name is between 1 and 64 bytes and unique within its application
pub const MIN_BOX_NAME_LEN: usize = 1;
pub const MAX_BOX_NAME_LEN: usize = 64;
// Each box reference in a transaction grants access to 1 KiB of box storage
pub const BOX_REF_BYTES: u64 = 1024;
// Maximum foreign references (boxes, assets, apps, accounts) per transaction
pub const MAX_TX_REFERENCES: usize = 8;

// Box minimum balance pricing, in microunits
// required = BOX_FLAT_MIN_BALANCE + BOX_BYTE_MIN_BALANCE * (len(name) + size)
pub const BOX_FLAT_MIN_BALANCE: u64 = 2500;
pub const BOX_BYTE_MIN_BALANCE: u64 = 400;

// Application call limits
pub const MAX_APP_ARGS: usize = 16;
pub const MAX_APP_TOTAL_ARG_LEN: usize = 2048;

// Number of rounds a transaction stays valid after the suggested first round
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1000;
// Rounds waited for a submitted transaction to be confirmed
pub const DEFAULT_WAIT_ROUNDS: u64 = 30;

// Bytes added to an unsigned transaction to estimate its signed size
pub const SIGNATURE_OVERHEAD: u64 = 75;

// Domain separation prefixes
pub const TX_ID_PREFIX: &[u8] = b"TX";
pub const TX_GROUP_PREFIX: &[u8] = b"TG";
pub const APP_ID_PREFIX: &[u8] = b"appID";
