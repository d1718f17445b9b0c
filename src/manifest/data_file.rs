//! Static data-file parsing.
//!
//! Reads the restricted, logic-free PowerShell data-file language used by
//! `.psd1` manifests and produces a [`serde_json::Value`].
//!
//! # Supported Syntax
//!
//! - Hashtables: `@{ Key = value; Other = value }` (newline or `;` separated)
//! - Arrays: `@( 'a', 'b' )`, `@( 'a'` newline `'b' )`, or bare `'a', 'b'`
//! - Strings: `'single'` (`''` escape), `"double"` (backtick and `""` escapes)
//! - Numbers: `42`, `-1`, `3.5`
//! - Constants: `$true`, `$false`, `$null`
//! - Comments: `# line` and `<# block #>`
//!
//! Variables, sub-expressions, script blocks, and commands are rejected.
//!
//! # Example
//!
//! ```
//! use modstrap::manifest::data_file;
//!
//! let value = data_file::parse("@{ RequiredModules = @('Az.Storage', 'Pester') }").unwrap();
//! assert_eq!(value["RequiredModules"][1], "Pester");
//! ```

use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// A syntax error with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {line}:{column}")]
pub struct DataFileError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    HashStart,
    ArrayStart,
    RBrace,
    RParen,
    Equals,
    Comma,
    Semicolon,
    Newline,
    Str(String),
    Num(Number),
    Constant(Value),
    Word(String),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::HashStart => "'@{'".to_string(),
            Token::ArrayStart => "'@('".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Newline => "end of line".to_string(),
            Token::Str(s) => format!("string '{}'", s),
            Token::Num(n) => format!("number {}", n),
            Token::Constant(v) => format!("constant {}", v),
            Token::Word(w) => format!("'{}'", w),
            Token::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> DataFileError {
        DataFileError {
            line,
            column,
            message: message.into(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, DataFileError> {
        let mut tokens = Vec::new();

        loop {
            let (line, column) = (self.line, self.column);
            let Some(c) = self.bump() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let token = match c {
                ' ' | '\t' | '\r' | '\u{feff}' => continue,
                '\n' => Token::Newline,
                '#' => {
                    while let Some(&next) = self.chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    continue;
                }
                '<' if self.chars.peek() == Some(&'#') => {
                    self.bump();
                    self.skip_block_comment(line, column)?;
                    continue;
                }
                '@' => match self.bump() {
                    Some('{') => Token::HashStart,
                    Some('(') => Token::ArrayStart,
                    _ => return Err(self.error(line, column, "expected '@{' or '@('")),
                },
                '}' => Token::RBrace,
                ')' => Token::RParen,
                '=' => Token::Equals,
                ',' => Token::Comma,
                ';' => Token::Semicolon,
                '\'' => Token::Str(self.single_quoted(line, column)?),
                '"' => Token::Str(self.double_quoted(line, column)?),
                '$' => self.constant(line, column)?,
                '-' | '0'..='9' => self.number(c, line, column)?,
                c if c.is_alphabetic() || c == '_' => Token::Word(self.word(c)),
                '{' | '(' | '[' => {
                    return Err(self.error(
                        line,
                        column,
                        format!("'{}' starts executable code, which is not allowed", c),
                    ))
                }
                other => {
                    return Err(self.error(line, column, format!("unexpected character '{}'", other)))
                }
            };

            tokens.push(Spanned {
                token,
                line,
                column,
            });
        }
    }

    fn skip_block_comment(&mut self, line: usize, column: usize) -> Result<(), DataFileError> {
        while let Some(c) = self.bump() {
            if c == '#' && self.chars.peek() == Some(&'>') {
                self.bump();
                return Ok(());
            }
        }
        Err(self.error(line, column, "unterminated block comment"))
    }

    fn single_quoted(&mut self, line: usize, column: usize) -> Result<String, DataFileError> {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == '\'' {
                if self.chars.peek() == Some(&'\'') {
                    self.bump();
                    out.push('\'');
                    continue;
                }
                return Ok(out);
            }
            out.push(c);
        }
        Err(self.error(line, column, "unterminated string"))
    }

    fn double_quoted(&mut self, line: usize, column: usize) -> Result<String, DataFileError> {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '"' => {
                    if self.chars.peek() == Some(&'"') {
                        self.bump();
                        out.push('"');
                        continue;
                    }
                    return Ok(out);
                }
                '`' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(other) => out.push(other),
                    None => break,
                },
                '$' => {
                    if let Some(&next) = self.chars.peek() {
                        if next.is_alphanumeric() || matches!(next, '_' | '(' | '{') {
                            return Err(self.error(
                                self.line,
                                self.column,
                                "variable expansion is not allowed in data files",
                            ));
                        }
                    }
                    out.push('$');
                }
                other => out.push(other),
            }
        }
        Err(self.error(line, column, "unterminated string"))
    }

    fn constant(&mut self, line: usize, column: usize) -> Result<Token, DataFileError> {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }

        match name.to_ascii_lowercase().as_str() {
            "true" => Ok(Token::Constant(Value::Bool(true))),
            "false" => Ok(Token::Constant(Value::Bool(false))),
            "null" => Ok(Token::Constant(Value::Null)),
            _ => Err(self.error(
                line,
                column,
                format!("variable '${}' is not allowed in data files", name),
            )),
        }
    }

    fn number(&mut self, first: char, line: usize, column: usize) -> Result<Token, DataFileError> {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if let Ok(n) = text.parse::<i64>() {
            return Ok(Token::Num(Number::from(n)));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Token::Num)
            .ok_or_else(|| self.error(line, column, format!("invalid number '{}'", text)))
    }

    fn word(&mut self, first: char) -> String {
        let mut word = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '-') {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        word
    }
}

/// Deepest allowed nesting of `@{ }` and `@( )`.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Spanned {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, tok: &Spanned, expected: &str) -> DataFileError {
        DataFileError {
            line: tok.line,
            column: tok.column,
            message: format!("expected {}, found {}", expected, tok.token.describe()),
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek().token, Token::Newline | Token::Semicolon) {
            self.next();
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek().token == Token::Newline {
            self.next();
        }
    }

    fn document(&mut self) -> Result<Value, DataFileError> {
        self.skip_separators();
        let start = self.next();
        if start.token != Token::HashStart {
            return Err(self.unexpected(&start, "'@{' at the top of the data file"));
        }
        let value = self.hashtable()?;
        self.skip_separators();
        let end = self.next();
        if end.token != Token::Eof {
            return Err(self.unexpected(&end, "end of file"));
        }
        Ok(value)
    }

    // Called after '@{' has been consumed.
    fn hashtable(&mut self) -> Result<Value, DataFileError> {
        let mut map = Map::new();

        loop {
            self.skip_separators();
            let key_tok = self.next();
            let key = match key_tok.token {
                Token::RBrace => return Ok(Value::Object(map)),
                Token::Word(ref w) => w.clone(),
                Token::Str(ref s) => s.clone(),
                Token::Num(ref n) => n.to_string(),
                _ => return Err(self.unexpected(&key_tok, "a key or '}'")),
            };

            if map.keys().any(|existing| existing.eq_ignore_ascii_case(&key)) {
                return Err(DataFileError {
                    line: key_tok.line,
                    column: key_tok.column,
                    message: format!("duplicate key '{}'", key),
                });
            }

            let eq = self.next();
            if eq.token != Token::Equals {
                return Err(self.unexpected(&eq, "'='"));
            }
            self.skip_newlines();

            let value = self.expression()?;
            map.insert(key, value);

            let after = self.peek().clone();
            match after.token {
                Token::Newline | Token::Semicolon | Token::RBrace => {}
                _ => return Err(self.unexpected(&after, "end of entry")),
            }
        }
    }

    // Called after '@(' has been consumed. Nested arrays stay nested.
    fn array(&mut self) -> Result<Value, DataFileError> {
        let mut items = Vec::new();

        loop {
            self.skip_separators();
            if self.peek().token == Token::RParen {
                self.next();
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);
            while self.peek().token == Token::Comma {
                self.next();
                self.skip_newlines();
                items.push(self.value()?);
            }

            let after = self.peek().clone();
            match after.token {
                Token::Newline | Token::Semicolon | Token::RParen => {}
                _ => return Err(self.unexpected(&after, "',' or ')'")),
            }
        }
    }

    fn nested(
        &mut self,
        line: usize,
        column: usize,
        parse: fn(&mut Parser) -> Result<Value, DataFileError>,
    ) -> Result<Value, DataFileError> {
        if self.depth >= MAX_DEPTH {
            return Err(DataFileError {
                line,
                column,
                message: format!("values nested too deeply (limit {})", MAX_DEPTH),
            });
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    /// A value, or a comma list of values.
    fn expression(&mut self) -> Result<Value, DataFileError> {
        let first = self.value()?;
        if self.peek().token != Token::Comma {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.peek().token == Token::Comma {
            self.next();
            self.skip_newlines();
            items.push(self.value()?);
        }
        Ok(Value::Array(items))
    }

    fn value(&mut self) -> Result<Value, DataFileError> {
        let tok = self.next();
        match tok.token {
            Token::HashStart => self.nested(tok.line, tok.column, Parser::hashtable),
            Token::ArrayStart => self.nested(tok.line, tok.column, Parser::array),
            Token::Str(s) => Ok(Value::String(s)),
            Token::Num(n) => Ok(Value::Number(n)),
            Token::Constant(v) => Ok(v),
            Token::Word(ref w) => Err(DataFileError {
                line: tok.line,
                column: tok.column,
                message: format!("bare word '{}' is not allowed; quote strings", w),
            }),
            _ => Err(self.unexpected(&tok, "a value")),
        }
    }
}

/// Parse data-file content into a JSON value (always an object on success).
pub fn parse(content: &str) -> Result<Value, DataFileError> {
    let tokens = Lexer::new(content).tokenize()?;
    Parser {
        tokens,
        pos: 0,
        depth: 0,
    }
    .document()
}

/// Quick check used for format sniffing.
pub fn looks_like_data_file(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .is_some_and(|line| line.starts_with("@{"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_typical_manifest() {
        let content = r#"
# Modules for the build agent
@{
    RequiredModules = @(
        'Az.Storage'
        'Pester'
    )
    ImportedModules = @('Microsoft.PowerShell.Utility')
    MyModules       = 'MyCompany.Tools', 'MyCompany.Deploy'
}
"#;
        let value = parse(content).unwrap();
        assert_eq!(
            value,
            json!({
                "RequiredModules": ["Az.Storage", "Pester"],
                "ImportedModules": ["Microsoft.PowerShell.Utility"],
                "MyModules": ["MyCompany.Tools", "MyCompany.Deploy"]
            })
        );
    }

    #[test]
    fn parses_empty_hashtable() {
        assert_eq!(parse("@{}").unwrap(), json!({}));
        assert_eq!(parse("\n@{\n}\n").unwrap(), json!({}));
    }

    #[test]
    fn parses_semicolon_separated_entries() {
        let value = parse("@{ A = 'x'; B = 2; C = $true; D = $null }").unwrap();
        assert_eq!(value, json!({ "A": "x", "B": 2, "C": true, "D": null }));
    }

    #[test]
    fn parses_nested_hashtables() {
        let value = parse("@{ PrivateData = @{ Tags = @('a', 'b') } }").unwrap();
        assert_eq!(value["PrivateData"]["Tags"], json!(["a", "b"]));
    }

    #[test]
    fn comma_list_continues_across_lines() {
        let value = parse("@{ MyModules = 'One',\n    'Two' }").unwrap();
        assert_eq!(value["MyModules"], json!(["One", "Two"]));
    }

    #[test]
    fn handles_string_escapes() {
        let value = parse(r#"@{ A = 'it''s'; B = "say ""hi"""; C = "tab`there" }"#).unwrap();
        assert_eq!(value["A"], "it's");
        assert_eq!(value["B"], "say \"hi\"");
        assert_eq!(value["C"], "tab\there");
    }

    #[test]
    fn skips_block_comments() {
        let value = parse("<# header\n spans lines #>\n@{ A = 1 <# inline #> }").unwrap();
        assert_eq!(value["A"], 1);
    }

    #[test]
    fn accepts_quoted_keys() {
        let value = parse("@{ 'Required Modules' = @() }").unwrap();
        assert_eq!(value["Required Modules"], json!([]));
    }

    #[test]
    fn parses_decimal_and_negative_numbers() {
        let value = parse("@{ A = 3.5; B = -2 }").unwrap();
        assert_eq!(value["A"], 3.5);
        assert_eq!(value["B"], -2);
    }

    #[test]
    fn rejects_variables() {
        let err = parse("@{ A = $env:PATH }").unwrap_err();
        assert!(err.message.contains("not allowed"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn rejects_variable_expansion_in_double_quotes() {
        let err = parse(r#"@{ A = "$home\modules" }"#).unwrap_err();
        assert!(err.message.contains("variable expansion"));
    }

    #[test]
    fn allows_literal_dollar_in_double_quotes() {
        let value = parse(r#"@{ A = "costs 5 $" }"#).unwrap();
        assert_eq!(value["A"], "costs 5 $");
    }

    #[test]
    fn rejects_commands() {
        let err = parse("@{ A = Get-Module }").unwrap_err();
        assert!(err.message.contains("bare word"));
    }

    #[test]
    fn rejects_script_blocks() {
        let err = parse("@{ A = { Remove-Item x } }").unwrap_err();
        assert!(err.message.contains("executable code"));
    }

    #[test]
    fn rejects_duplicate_keys_case_insensitively() {
        let err = parse("@{ A = 1\n a = 2 }").unwrap_err();
        assert!(err.message.contains("duplicate key"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn rejects_missing_top_level_hashtable() {
        let err = parse("'just a string'").unwrap_err();
        assert!(err.message.contains("'@{'"));
    }

    #[test]
    fn rejects_trailing_content() {
        let err = parse("@{ A = 1 }\n@{ B = 2 }").unwrap_err();
        assert!(err.message.contains("end of file"));
    }

    #[test]
    fn reports_unterminated_string_position() {
        let err = parse("@{\n  A = 'open\n}").unwrap_err();
        assert_eq!(err.message, "unterminated string");
        assert_eq!((err.line, err.column), (2, 7));
    }

    #[test]
    fn reports_missing_equals() {
        let err = parse("@{ A 'x' }").unwrap_err();
        assert!(err.to_string().contains("expected '='"));
    }

    #[test]
    fn keeps_nested_arrays_as_elements() {
        let value = parse("@{ A = @(@('a', 'b'), 'c') }").unwrap();
        assert_eq!(value["A"], json!([["a", "b"], "c"]));
    }

    #[test]
    fn array_items_split_by_commas_and_newlines() {
        let value = parse("@{ A = @('a', 'b'\n  'c') }").unwrap();
        assert_eq!(value["A"], json!(["a", "b", "c"]));
    }

    #[test]
    fn accepts_nesting_up_to_the_limit() {
        let content = format!(
            "@{{ A = {}'x'{} }}",
            "@(".repeat(MAX_DEPTH),
            ")".repeat(MAX_DEPTH)
        );
        assert!(parse(&content).is_ok());
    }

    #[test]
    fn rejects_nesting_past_the_limit() {
        let content = format!(
            "@{{ A = {}'x'{} }}",
            "@(".repeat(MAX_DEPTH + 1),
            ")".repeat(MAX_DEPTH + 1)
        );
        let err = parse(&content).unwrap_err();
        assert!(err.message.contains("nested too deeply"));
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 8 + 2 * MAX_DEPTH);
    }

    #[test]
    fn sniffs_data_files() {
        assert!(looks_like_data_file("# comment\n@{ A = 1 }"));
        assert!(!looks_like_data_file("{\"A\": 1}"));
        assert!(!looks_like_data_file("RequiredModules: []"));
    }
}
