use crate::ir::WordList;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static DELIMITED_WEIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<text>.+?)\s*[:,;\t]\s*(?P<weight>\d+(?:\.\d+)?)$").unwrap()
});
static LEADING_WEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<weight>\d+(?:\.\d+)?)\s+(?P<text>.+)$").unwrap());
static TRAILING_WEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<text>.+?)\s+(?P<weight>\d+(?:\.\d+)?)$").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub words: WordList,
    pub init_config: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JsonWord {
    text: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Parse a word list. Accepts a JSON array of `{ "text", "weight" }` objects,
/// or one entry per line as `word weight`, `weight word` or `word: weight`.
/// Lines without a weight count each of their words once.
pub fn parse_words(input: &str) -> Result<ParseOutput> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('[') {
        return parse_json_words(trimmed);
    }

    let mut entries: Vec<(String, f64)> = Vec::new();
    let mut init_config = None;
    for (line_no, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(line) {
            let json_str = caps.get(1).map(|m| m.as_str()).unwrap_or("{}");
            let value = match serde_json::from_str::<serde_json::Value>(json_str) {
                Ok(value) => value,
                Err(_) => json5::from_str::<serde_json::Value>(json_str).map_err(|err| {
                    anyhow::anyhow!("line {}: invalid init directive: {}", line_no + 1, err)
                })?,
            };
            init_config = Some(integral_numbers(value));
            continue;
        }
        if line.starts_with("%%") || line.starts_with('#') {
            continue;
        }

        if let Some((text, weight)) = weighted_entry(line) {
            if !weight.is_finite() {
                return Err(anyhow::anyhow!(
                    "line {}: weight for '{}' is out of range",
                    line_no + 1,
                    text
                ));
            }
            if weight > 0.0 && !text.is_empty() {
                entries.push((text, weight));
            }
            continue;
        }

        for token in line.split_whitespace() {
            let token = trim_token(token);
            if !token.is_empty() {
                entries.push((token.to_string(), 1.0));
            }
        }
    }

    Ok(ParseOutput {
        words: WordList::from_entries(entries),
        init_config,
    })
}

fn parse_json_words(input: &str) -> Result<ParseOutput> {
    let parsed: Vec<JsonWord> = serde_json::from_str(input)?;
    let mut entries = Vec::with_capacity(parsed.len());
    for word in parsed {
        let text = word.text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        if !word.weight.is_finite() || word.weight < 0.0 {
            return Err(anyhow::anyhow!(
                "word '{}' has invalid weight {}",
                text,
                word.weight
            ));
        }
        if word.weight > 0.0 {
            entries.push((text, word.weight));
        }
    }
    Ok(ParseOutput {
        words: WordList::from_entries(entries),
        init_config: None,
    })
}

// JSON5 numbers may arrive as floats; integral ones are turned back into
// integers so they still deserialize into count fields.
fn integral_numbers(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Value::from(f as i64)
            }
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, integral_numbers(value)))
                .collect(),
        ),
        other => other,
    }
}

fn weighted_entry(line: &str) -> Option<(String, f64)> {
    let caps = DELIMITED_WEIGHT_RE
        .captures(line)
        .or_else(|| LEADING_WEIGHT_RE.captures(line))
        .or_else(|| TRAILING_WEIGHT_RE.captures(line))?;
    let weight: f64 = caps.name("weight")?.as_str().parse().ok()?;
    let text = unquote(caps.name("text")?.as_str().trim());
    Some((text.to_string(), weight))
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[1..text.len() - 1].trim();
        }
    }
    text
}

fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
}
