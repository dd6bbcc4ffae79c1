use crate::error::PokedexError;
use crate::ingest::MAX_POKEMON_ID;
use crate::record::Rarity;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TYPE_LENGTH: usize = 32;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Largest page a caller may request; one page can hold the whole collection.
pub const MAX_PAGE_SIZE: u32 = MAX_POKEMON_ID;

/// Filter value meaning "no filter".
pub const ALL: &str = "all";

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, PokedexError> {
    if input.len() > max_len {
        return Err(PokedexError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(PokedexError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

fn is_unset(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL)
}

/// Validate a name search term. Blank means no filter.
pub fn validate_name(input: &str) -> Result<Option<String>, PokedexError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    sanitize_text(input, MAX_NAME_LENGTH).map(Some)
}

/// Validate a type label: lowercased, letters and hyphens only. `all` or blank
/// means no filter.
pub fn validate_type(input: &str) -> Result<Option<String>, PokedexError> {
    if is_unset(input) {
        return Ok(None);
    }
    let lower = sanitize_text(input, MAX_TYPE_LENGTH)?.to_lowercase();
    if !lower.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
        return Err(PokedexError::InvalidInput(format!(
            "invalid type '{}'. Expected a type name such as fire or water",
            input
        )));
    }
    Ok(Some(lower))
}

/// Validate a rarity class: legendary, mythical or normal (case-insensitive).
pub fn validate_rarity(input: &str) -> Result<Option<Rarity>, PokedexError> {
    if is_unset(input) {
        return Ok(None);
    }
    input
        .trim()
        .to_lowercase()
        .parse::<Rarity>()
        .map(Some)
        .map_err(|_| {
            PokedexError::InvalidInput(format!(
                "unknown rarity '{}'. Valid values: legendary, mythical, normal, all",
                input
            ))
        })
}

fn parse_positive(input: &str, field: &str) -> Result<u32, PokedexError> {
    match input.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PokedexError::InvalidInput(format!(
            "{} must be a positive integer, got '{}'",
            field, input
        ))),
    }
}

/// Validate a generation number. `all` or blank means no filter.
pub fn validate_generation(input: &str) -> Result<Option<u32>, PokedexError> {
    if is_unset(input) {
        return Ok(None);
    }
    parse_positive(input, "generation").map(Some)
}

/// Validate a 1-based page number.
pub fn validate_page(input: &str) -> Result<u32, PokedexError> {
    parse_positive(input, "page")
}

/// Validate page size (must be 1..=MAX_PAGE_SIZE).
pub fn validate_limit(input: &str) -> Result<u32, PokedexError> {
    let limit = parse_positive(input, "limit")?;
    if limit > MAX_PAGE_SIZE {
        return Err(PokedexError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(limit)
}

/// Validate a seed request size. Values above the highest known id are
/// capped rather than rejected.
pub fn validate_seed_limit(input: &str) -> Result<u32, PokedexError> {
    Ok(parse_positive(input, "limit")?.min(MAX_POKEMON_ID))
}
