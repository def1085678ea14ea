use crate::models::AgeRange;

/// Parse a comma separated age list such as `"4, 6, 11"`
///
/// Every entry must be a non-negative integer. An empty string yields an
/// empty list.
pub fn parse_ages(input: &str) -> Result<Vec<u32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    trimmed
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<u32>()
                .map_err(|_| format!("'{}' is not a valid age", part))
        })
        .collect()
}

/// Parse a free-text age range such as `"5-10"` or `"7"`
///
/// Returns `Ok(None)` for blank input (no preference).
pub fn parse_age_range(input: &str) -> Result<Option<AgeRange>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (min, max) = match trimmed.split_once('-') {
        Some((min, max)) => (min.trim(), max.trim()),
        None => (trimmed, trimmed),
    };

    let min = min
        .parse::<u32>()
        .map_err(|_| format!("invalid age range '{}'", trimmed))?;
    let max = max
        .parse::<u32>()
        .map_err(|_| format!("invalid age range '{}'", trimmed))?;

    AgeRange::new(min, max).map(Some)
}
