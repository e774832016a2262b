use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Name a source was registered under. Only used for attribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceName(String);

impl SourceName {
    pub fn new(name: impl Into<String>) -> Self {
        SourceName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role and session variables of the user a query runs for.
///
/// Session variable names are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub role: String,
    #[serde(default, deserialize_with = "lowercase_keys")]
    session_variables: BTreeMap<String, String>,
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let vars = BTreeMap::<String, String>::deserialize(deserializer)?;
    Ok(vars
        .into_iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect())
}

impl UserInfo {
    pub fn new(role: impl Into<String>) -> Self {
        UserInfo {
            role: role.into(),
            session_variables: BTreeMap::new(),
        }
    }

    pub fn with_session_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_variables
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn session_variables(&self) -> &BTreeMap<String, String> {
        &self.session_variables
    }

    /// Session variable lookup, names are case insensitive.
    pub fn session_variable(&self, name: &str) -> Option<&str> {
        self.session_variables
            .get(&name.to_lowercase())
            .map(|s| s.as_str())
    }
}
