use crate::config::{MICRO_UNITS, UNIT_DECIMALS};

/// Format an amount of microunits as whole units, e.g. `1.645300`.
pub fn format_units(micro_units: u64) -> String {
    format!(
        "{}.{:0width$}",
        micro_units / MICRO_UNITS,
        micro_units % MICRO_UNITS,
        width = UNIT_DECIMALS as usize
    )
}

/// Parse a decimal amount of whole units into microunits.
pub fn parse_units(value: &str) -> Option<u64> {
    let value = value.trim();
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };
    if fraction.len() > UNIT_DECIMALS as usize || (whole.is_empty() && fraction.is_empty()) {
        return None;
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = UNIT_DECIMALS as usize);
        padded.parse().ok()?
    };
    whole.checked_mul(MICRO_UNITS)?.checked_add(fraction)
}

/// Make sure the node address has a scheme and no trailing slash.
pub fn sanitize_node_address(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_owned()
    } else {
        format!("http://{}", address)
    }
}
