//! Conversion of user-typed amounts into contract arguments.

use ethers::types::U256;
use ethers::utils::parse_ether;

/// Wei per ether is 10^18, so amounts carry at most 18 fractional digits.
const MAX_FRACTION_DIGITS: usize = 18;
/// 10^59 * 10^18 stays below U256::MAX; one more digit can overflow.
const MAX_INTEGER_DIGITS: usize = 59;

/// Decimal ether amount to wei. Anything that is not a non-negative decimal
/// number becomes zero.
pub fn parse_entry_fee(input: &str) -> U256 {
    let input = input.trim();
    if input.is_empty() || input.starts_with('-') {
        return U256::zero();
    }
    if !input.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return U256::zero();
    }

    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    if fraction.contains('.') {
        return U256::zero();
    }
    let whole = whole.trim_start_matches('0');
    if whole.len() > MAX_INTEGER_DIGITS || fraction.len() > MAX_FRACTION_DIGITS {
        return U256::zero();
    }
    parse_ether(input).unwrap_or_else(|_| U256::zero())
}

/// Player count typed by the owner; invalid input becomes zero.
pub fn parse_max_players(input: &str) -> u8 {
    input.trim().parse().unwrap_or(0)
}
