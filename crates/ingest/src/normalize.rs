use once_cell::sync::Lazy;
use rackguard_validator::UnitValue;
use regex::Regex;

static UNIT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<whole>\d+)(?:\.(?P<decimal>\d+)|(?P<ratio>(?:\s+\d+)?\s*/\s*\d+)|(?P<glyph>\s*[½¼¾⅓⅔⅛⅜⅝⅞]))?|(?P<bare>[½¼¾⅓⅔⅛⅜⅝⅞])",
    )
    .expect("unit pattern compiles")
});

/// Trimmed cell text; empty cells are absent.
pub fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// First number in a cell: "RU 22", "U22" and "22U" all read as 22.
///
/// A leading minus sign is kept when it starts the cell or follows
/// whitespace, so "-3" reads as -3 while "U-3" reads as 3. A non-zero
/// decimal part, a slash fraction ("1/2", "10 1/2") or a fraction glyph
/// ("½") is kept verbatim for review. Integer parts that overflow are
/// treated as unreadable.
pub fn units(value: &str) -> Option<UnitValue> {
    let value = value.trim();
    let captures = UNIT_NUMBER.captures(value)?;
    let matched = captures.get(0)?;
    let negative = is_negated(&value[..matched.start()]);
    let signed = |text: &str| {
        if negative {
            format!("-{text}")
        } else {
            text.to_string()
        }
    };

    if captures.name("bare").is_some()
        || captures.name("ratio").is_some()
        || captures.name("glyph").is_some()
    {
        return Some(UnitValue::Fractional(signed(matched.as_str())));
    }

    let decimal = captures.name("decimal").map(|m| m.as_str()).unwrap_or("");
    if decimal.chars().any(|digit| digit != '0') {
        return Some(UnitValue::Fractional(signed(matched.as_str())));
    }

    let whole = captures.name("whole")?.as_str().parse::<i64>().ok()?;
    Some(UnitValue::Whole(if negative { -whole } else { whole }))
}

/// True when `prefix` ends in a minus sign that starts a word.
fn is_negated(prefix: &str) -> bool {
    let Some(rest) = prefix.strip_suffix('-') else {
        return false;
    };
    rest.chars().next_back().map_or(true, char::is_whitespace)
}

/// Map common spellings onto NetBox device status values. Unknown values
/// pass through lowercased.
pub fn status(value: &str) -> Option<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }
    let normalized = match value.as_str() {
        "online" | "live" => "active",
        "pending" => "planned",
        "staging" => "staged",
        "decommissioned" => "decommissioning",
        other => other,
    };
    Some(normalized.to_string())
}
