use serde::{Deserialize, Deserializer};
use validator::ValidationErrors;

/// Deserialize a string with surrounding whitespace removed, so a blank value fails `length(min = 1)`
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Optional counterpart of [`trimmed`]; pair it with `#[serde(default)]`
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()))
}

/// Flatten validator errors into `field: message` lines, sorted by field
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|err| match &err.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, err.code),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    lines.sort();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 1, message = "name is required"))]
        name: String,

        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(length(min = 1, max = 3))]
        tag: Option<String>,
    }

    #[test]
    fn test_trimmed_strips_whitespace() {
        let sample: Sample = serde_json::from_str(r#"{"name": "  books  "}"#).unwrap();
        assert_eq!(sample.name, "books");
        assert_eq!(sample.tag, None);
    }

    #[test]
    fn test_blank_value_fails_length() {
        let sample: Sample = serde_json::from_str(r#"{"name": "   ", "tag": "abcd"}"#).unwrap();
        let errors = sample.validate().unwrap_err();
        let lines = flatten_errors(&errors);
        assert_eq!(lines, vec!["name: name is required", "tag: length"]);
    }
}
