use serde::{Deserialize, Serialize};

/// What to do with a feed release date that is not a strict `YYYY-MM-DD` string
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseDatePolicy {
    /// Keep the record and use the calendar day of parsing as its release date
    #[default]
    Lenient,
    /// Reject the record with a field error
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names() {
        assert_eq!(ReleaseDatePolicy::default(), ReleaseDatePolicy::Lenient);
        assert_eq!(serde_json::to_string(&ReleaseDatePolicy::Strict).unwrap(), "\"strict\"");
        let parsed: ReleaseDatePolicy = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(parsed, ReleaseDatePolicy::Lenient);
    }
}
