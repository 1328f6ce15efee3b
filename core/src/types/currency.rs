use serde::{Deserialize, Serialize};

/// An active currency as listed by `/currencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_and_flag_are_optional() {
        let currency: Currency = serde_json::from_str(r#"{"code":"EUR","name":"Euro"}"#).unwrap();
        assert_eq!(currency.symbol, "");
        assert_eq!(currency.flag, None);
    }
}
