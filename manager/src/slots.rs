//! Partitioning of box access into per-transaction reference slots.
//!
//! Each slot grants access to [`BOX_REF_BYTES`] of box storage. The first
//! slot names the box, the others are anonymous and only extend the budget.

use algobox_common::{
    config::{BOX_REF_BYTES, MAX_BOX_NAME_LEN, MAX_TX_REFERENCES, MIN_BOX_NAME_LEN},
    transaction::BoxReference,
};
use log::debug;

use crate::error::ValidationError;

pub fn validate_box_name(name: &[u8]) -> Result<(), ValidationError> {
    if name.len() < MIN_BOX_NAME_LEN || name.len() > MAX_BOX_NAME_LEN {
        return Err(ValidationError::InvalidBoxName {
            len: name.len(),
            min: MIN_BOX_NAME_LEN,
            max: MAX_BOX_NAME_LEN,
        });
    }
    Ok(())
}

/// Number of 1 KiB slots needed to access `size` bytes.
pub fn slots_needed(size: u64) -> u64 {
    size.div_ceil(BOX_REF_BYTES)
}

/// Build the ordered slots for a call touching `size` bytes of box `name`.
pub fn box_references(name: &[u8], size: u64) -> Result<Vec<BoxReference>, ValidationError> {
    validate_box_name(name)?;

    let needed = slots_needed(size);
    if log::log_enabled!(log::Level::Debug) {
        debug!("box size: {}, slots needed: {}", size, needed);
    }
    if needed > MAX_TX_REFERENCES as u64 {
        return Err(ValidationError::SlotLimitExceeded {
            needed,
            max: MAX_TX_REFERENCES,
        });
    }

    // an empty box is still referenced by name
    let count = needed.max(1) as usize;
    let mut references = Vec::with_capacity(count);
    references.push(BoxReference::new(0, name));
    references.resize(count, BoxReference::empty());
    Ok(references)
}
