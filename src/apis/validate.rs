/// Input validation for provider calls
///
/// Runs before the executor pipeline so malformed input never costs quota
/// or network I/O.
use crate::errors::CoreError;

/// Base58 alphabet used by Solana addresses (no 0, O, I, l)
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const MIN_MINT_LEN: usize = 32;
const MAX_MINT_LEN: usize = 44;
const MIN_API_KEY_LEN: usize = 16;

/// Validate a token mint / account address
pub fn validate_mint(mint: &str) -> Result<(), CoreError> {
    if mint.len() < MIN_MINT_LEN || mint.len() > MAX_MINT_LEN {
        return Err(CoreError::validation(
            "mint",
            format!(
                "expected {}-{} characters, got {}",
                MIN_MINT_LEN,
                MAX_MINT_LEN,
                mint.len()
            ),
        ));
    }

    if let Some(bad) = mint.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(CoreError::validation(
            "mint",
            format!("invalid base58 character '{}'", bad),
        ));
    }

    Ok(())
}

/// Validate an API key at provider construction time
pub fn validate_api_key(key: &str) -> Result<(), CoreError> {
    if key.trim().is_empty() {
        return Err(CoreError::validation("api_key", "must not be empty"));
    }
    if key.len() < MIN_API_KEY_LEN {
        return Err(CoreError::validation(
            "api_key",
            format!("must be at least {} characters", MIN_API_KEY_LEN),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    const WSOL: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn accepts_well_formed_mints() {
        validate_mint(WSOL).unwrap();
        validate_mint("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263").unwrap();
    }

    #[test]
    fn rejects_bad_lengths() {
        let err = validate_mint("abc").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let too_long = "1".repeat(45);
        assert!(validate_mint(&too_long).is_err());
    }

    #[test]
    fn rejects_non_base58_characters() {
        // 'O' and '0' are not in the base58 alphabet
        let bad = "O0000000000000000000000000000000000000000";
        let err = validate_mint(bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn api_keys_must_be_non_empty_and_long_enough() {
        assert!(validate_api_key("").is_err());
        assert!(validate_api_key("   ").is_err());
        assert!(validate_api_key("short").is_err());
        validate_api_key("0123456789abcdef").unwrap();
    }
}
