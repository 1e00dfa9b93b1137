pub mod output;
pub mod setup;

use crate::core::query::Param;
use anyhow::{Result, anyhow};

/// Parses a `key=value` query parameter given on the command line.
///
/// The value is sent upstream exactly as typed. Numbers that render back to
/// the same text are kept numeric so they hash the same way as parameters
/// built in code; anything else (`007`, `1.50`, `1e3`, `inf`) stays a string.
pub fn parse_param(raw: &str) -> Result<(String, Param)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Empty parameter name in '{raw}'"));
    }

    let numeric = value
        .parse::<i64>()
        .map(Param::Int)
        .ok()
        .or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Param::Float)
        })
        .filter(|param| param.to_query_value() == value);

    let param = numeric.unwrap_or_else(|| Param::Str(value.to_string()));
    Ok((key.to_string(), param))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_types() {
        assert_eq!(
            parse_param("places=2").unwrap(),
            ("places".to_string(), Param::Int(2))
        );
        assert_eq!(
            parse_param("amount=1.5").unwrap(),
            ("amount".to_string(), Param::Float(1.5))
        );
        assert_eq!(
            parse_param("crypto=true").unwrap(),
            ("crypto".to_string(), Param::Str("true".to_string()))
        );
        assert_eq!(
            parse_param("base=USD").unwrap(),
            ("base".to_string(), Param::Str("USD".to_string()))
        );
        assert_eq!(
            parse_param("symbols=USD,EUR").unwrap(),
            ("symbols".to_string(), Param::Str("USD,EUR".to_string()))
        );
    }

    #[test]
    fn test_parse_param_sends_value_verbatim() {
        for raw in ["007", "1.50", "+5", "1e3", "inf", "NaN", "-0", "2.0"] {
            let (_, param) = parse_param(&format!("code={raw}")).unwrap();
            assert_eq!(param.to_query_value(), raw, "value {raw} was rewritten");
        }
        assert_eq!(
            parse_param("code=007").unwrap().1,
            Param::Str("007".to_string())
        );
    }

    #[test]
    fn test_parse_param_rejects_malformed() {
        assert!(parse_param("base").is_err());
        assert!(parse_param("=USD").is_err());
    }
}
