//! Manifest record definitions.
//!
//! A manifest names three ordered lists of units. Every list is optional;
//! anything else in the file is ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key holding units that must be installed at a current version.
pub const REQUIRED_KEY: &str = "RequiredModules";
/// Key holding units loaded from the standard package source.
pub const IMPORTED_KEY: &str = "ImportedModules";
/// Key holding locally authored units.
pub const CUSTOM_KEY: &str = "MyModules";

/// Recognized top-level manifest keys.
pub const KNOWN_KEYS: [&str; 3] = [REQUIRED_KEY, IMPORTED_KEY, CUSTOM_KEY];

/// Characters a package-manager module name may contain.
static UNIT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]*$").expect("UNIT_NAME_REGEX must compile")
});

/// Whether `name` is a well-formed unit name.
///
/// Names are letters, digits, `_`, `.` and `-`, not starting with `.` or `-`.
/// Anything else (quotes, `$`, backticks, spaces) is rejected before it can
/// reach a command line.
pub fn is_valid_unit_name(name: &str) -> bool {
    UNIT_NAME_REGEX.is_match(name)
}

/// The decoded manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Units ensured installed and current, in manifest order.
    #[serde(rename = "RequiredModules", deserialize_with = "unit_list")]
    pub required_modules: Vec<String>,

    /// Units force-loaded from the standard package source.
    #[serde(rename = "ImportedModules", deserialize_with = "unit_list")]
    pub imported_modules: Vec<String>,

    /// Custom units force-loaded the same way as imported ones.
    #[serde(rename = "MyModules", deserialize_with = "unit_list")]
    pub my_modules: Vec<String>,
}

/// One of the three sequential phases over a unit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Ensure each required unit is installed and current.
    Install,
    /// Force-load each imported unit.
    Import,
    /// Force-load each custom unit.
    CustomImport,
}

impl Pass {
    /// Human label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Pass::Install => "required",
            Pass::Import => "imported",
            Pass::CustomImport => "custom",
        }
    }
}

impl Manifest {
    /// True when all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.required_modules.is_empty()
            && self.imported_modules.is_empty()
            && self.my_modules.is_empty()
    }

    /// The passes in execution order, paired with their unit lists.
    pub fn passes(&self) -> [(Pass, &[String]); 3] {
        [
            (Pass::Install, self.required_modules.as_slice()),
            (Pass::Import, self.imported_modules.as_slice()),
            (Pass::CustomImport, self.my_modules.as_slice()),
        ]
    }

    /// Total number of units across all passes.
    pub fn unit_count(&self) -> usize {
        self.required_modules.len() + self.imported_modules.len() + self.my_modules.len()
    }
}

/// Accepts null, a single string, or a list of strings.
fn unit_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(name)) => vec![Value::String(name)],
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected a unit name or a list of unit names, found {}",
                describe(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(name) => {
                let name = name.trim();
                if name.is_empty() {
                    Err(de::Error::custom(format!(
                        "unit name at position {} is empty",
                        i + 1
                    )))
                } else if !is_valid_unit_name(name) {
                    Err(de::Error::custom(format!(
                        "unit name '{}' at position {} may only contain letters, digits, '_', '.' and '-'",
                        name,
                        i + 1
                    )))
                } else {
                    Ok(name.to_string())
                }
            }
            other => Err(de::Error::custom(format!(
                "unit name at position {} must be a string, found {}",
                i + 1,
                describe(&other)
            ))),
        })
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
