//! Variable interpolation for command templates.
//!
//! Package manager commands are templates using `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with variable value
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! # Example
//!
//! ```yaml
//! install: "Install-Module -Name '${unit}'"
//! # With unit="Pester", produces: Install-Module -Name 'Pester'
//! ```

use crate::error::{ModstrapError, Result};
use std::collections::{HashMap, HashSet};

/// Variables every template may reference.
pub const KNOWN_VARIABLES: [&str; 2] = ["unit", "force"];

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing ${var} interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} -> literal ${...}
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                segments.push(Segment::Variable(var_name.trim().to_string()));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> HashSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Values available while expanding a template.
#[derive(Debug, Default, Clone)]
pub struct InterpolationContext {
    pub vars: HashMap<String, String>,
}

impl InterpolationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for one unit operation.
    pub fn for_unit(unit: &str) -> Self {
        Self::new().with("unit", unit)
    }

    /// Add a variable.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Resolve all `${var}` references in a template.
///
/// # Errors
///
/// Returns `ConfigValidationError` naming the first unknown variable.
pub fn resolve_string(input: &str, ctx: &InterpolationContext) -> Result<String> {
    let mut out = String::with_capacity(input.len());

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Variable(name) => {
                let value = ctx
                    .get(&name)
                    .ok_or_else(|| ModstrapError::ConfigValidationError {
                        message: format!("Unknown variable '${{{}}}' in '{}'", name, input),
                    })?;
                out.push_str(value);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_only() {
        assert_eq!(
            parse_interpolation("Get-Module"),
            vec![Segment::Literal("Get-Module".into())]
        );
    }

    #[test]
    fn parses_variable_between_literals() {
        assert_eq!(
            parse_interpolation("Import-Module '${unit}' -Global"),
            vec![
                Segment::Literal("Import-Module '".into()),
                Segment::Variable("unit".into()),
                Segment::Literal("' -Global".into()),
            ]
        );
    }

    #[test]
    fn escaped_variable_is_literal() {
        assert_eq!(
            parse_interpolation("echo $${unit}"),
            vec![Segment::Literal("echo ${unit}".into())]
        );
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(
            parse_interpolation("$env:PSModulePath"),
            vec![Segment::Literal("$env:PSModulePath".into())]
        );
    }

    #[test]
    fn extracts_variables() {
        let vars = extract_variables("${unit} ${force} ${unit}");
        assert_eq!(vars.len(), 2);
        assert!(vars.contains("unit"));
        assert!(vars.contains("force"));
    }

    #[test]
    fn resolves_unit_and_force() {
        let ctx = InterpolationContext::for_unit("Pester").with("force", "-Force");
        let cmd = resolve_string("Import-Module ${unit} ${force}", &ctx).unwrap();
        assert_eq!(cmd, "Import-Module Pester -Force");
    }

    #[test]
    fn unknown_variable_is_error() {
        let ctx = InterpolationContext::for_unit("Pester");
        let err = resolve_string("Install ${name}", &ctx).unwrap_err();
        assert!(err.to_string().contains("${name}"));
    }
}
