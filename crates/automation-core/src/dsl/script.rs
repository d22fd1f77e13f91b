//! Interpreter for automation scripts
//!
//! Automation scripts use a small Thor-style vocabulary (`say`, `say_status`,
//! `run`, `create_file`, `append_to_file`, `empty_directory`,
//! `javascript_import`). Each statement is a call with optional parentheses
//! whose arguments are quoted strings, `:symbols` or heredocs, and may end in
//! a `do ... end` block holding one string or heredoc.
//!
//! Statements are parsed and executed one at a time. Execution stops at the
//! first statement that fails; everything before it has already happened.

use super::actions::Actions;
use colored::Color;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors raised while running an automation script
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unknown automation statement `{name}`")]
    UnknownStatement { line: usize, name: String },

    #[error("line {line}: `{name}` {message}")]
    Arguments {
        line: usize,
        name: String,
        message: String,
    },

    #[error("line {line}: `{name}` failed: {source}")]
    Action {
        line: usize,
        name: String,
        #[source]
        source: io::Error,
    },
}

impl ExecutionError {
    /// 1-based line of the statement that failed
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::UnknownStatement { line, .. }
            | Self::Arguments { line, .. }
            | Self::Action { line, .. } => *line,
        }
    }
}

/// A literal argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Symbol(String),
}

impl Value {
    pub fn as_str(&self) -> &str {
        match self {
            Value::Str(s) | Value::Symbol(s) => s,
        }
    }
}

/// One parsed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    pub name: String,
    pub args: Vec<Value>,
}

impl Statement {
    fn text(&self, index: usize) -> &str {
        self.args.get(index).map(Value::as_str).unwrap_or("")
    }

    fn color(&self, index: usize) -> Option<Color> {
        self.args.get(index)?.as_str().parse().ok()
    }

    fn check_arity(&self, min: usize, max: usize) -> Result<(), ExecutionError> {
        let count = self.args.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("{}", min)
            } else {
                format!("{}..{}", min, max)
            };
            return Err(ExecutionError::Arguments {
                line: self.line,
                name: self.name.clone(),
                message: format!("expects {} argument(s), got {}", expected, count),
            });
        }
        Ok(())
    }
}

/// Run every statement of a script against `actions`
///
/// Returns the number of statements executed.
pub fn run_script<A: Actions + ?Sized>(
    source: &str,
    actions: &mut A,
) -> Result<usize, ExecutionError> {
    let mut executed = 0;
    for statement in Parser::new(source) {
        execute(&statement?, actions)?;
        executed += 1;
    }
    Ok(executed)
}

/// Execute a single statement
pub fn execute<A: Actions + ?Sized>(
    statement: &Statement,
    actions: &mut A,
) -> Result<(), ExecutionError> {
    let (min, max) = match statement.name.as_str() {
        "say" => (1, 2),
        "say_status" => (2, 3),
        "run" | "empty_directory" | "javascript_import" => (1, 1),
        "create_file" | "add_file" => (1, 2),
        "append_to_file" | "append_file" => (2, 2),
        _ => {
            return Err(ExecutionError::UnknownStatement {
                line: statement.line,
                name: statement.name.clone(),
            })
        }
    };
    statement.check_arity(min, max)?;

    let result = match statement.name.as_str() {
        "say" => actions.say(statement.text(0), statement.color(1)),
        "say_status" => {
            actions.emit_status(statement.text(0), statement.text(1), statement.color(2))
        }
        "run" => actions.run_command(statement.text(0)),
        "empty_directory" => actions.create_dir(Path::new(statement.text(0))),
        "create_file" | "add_file" => {
            actions.write_file(Path::new(statement.text(0)), statement.text(1))
        }
        "append_to_file" | "append_file" => {
            actions.append_file(Path::new(statement.text(0)), statement.text(1))
        }
        _ => actions.inject_import(statement.text(0)),
    };

    result.map_err(|source| ExecutionError::Action {
        line: statement.line,
        name: statement.name.clone(),
        source,
    })
}

/// Streaming statement parser; stops after the first error
pub struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    failed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            pos: 0,
            failed: false,
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.get(self.pos).copied()?;
        self.pos += 1;
        Some((self.pos, line))
    }

    /// Next line that is neither blank nor a comment
    fn next_significant_line(&mut self) -> Option<(usize, &'a str)> {
        loop {
            let (number, text) = self.next_line()?;
            let trimmed = text.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                return Some((number, text));
            }
        }
    }

    fn statement(&mut self, line: usize, text: &'a str) -> Result<Statement, ExecutionError> {
        let syntax = |message: String| ExecutionError::Syntax { line, message };

        let mut cursor = Cursor::new(text);
        cursor.skip_ws();
        let name = cursor
            .ident()
            .ok_or_else(|| syntax(format!("expected a statement, found `{}`", text.trim())))?
            .to_string();

        cursor.skip_ws();
        let parenthesized = cursor.eat('(');

        let mut args = Vec::new();
        let mut heredocs = Vec::new();
        loop {
            cursor.skip_ws();
            if cursor.at_end() || matches!(cursor.peek(), Some(')' | '#')) || cursor.at_keyword("do")
            {
                break;
            }
            match cursor.token().map_err(syntax)? {
                Token::Value(value) => args.push(value),
                Token::Heredoc(heredoc) => {
                    heredocs.push((args.len(), heredoc));
                    args.push(Value::Str(String::new()));
                }
            }
            cursor.skip_ws();
            if !cursor.eat(',') {
                break;
            }
        }

        if parenthesized && !cursor.eat(')') {
            return Err(syntax("expected `)`".to_string()));
        }

        cursor.skip_ws();
        let block = cursor.at_keyword("do");
        if block {
            cursor.advance("do".len());
            cursor.skip_ws();
        }
        if !cursor.at_end() && cursor.peek() != Some('#') {
            return Err(syntax(format!("unexpected `{}`", cursor.rest().trim())));
        }

        for (index, heredoc) in heredocs {
            args[index] = Value::Str(self.heredoc_body(line, &heredoc)?);
        }
        if block {
            args.push(self.block_value(line)?);
        }

        Ok(Statement { line, name, args })
    }

    fn heredoc_body(&mut self, line: usize, heredoc: &Heredoc) -> Result<String, ExecutionError> {
        let mut body = Vec::new();
        loop {
            let Some((_, text)) = self.next_line() else {
                return Err(ExecutionError::Syntax {
                    line,
                    message: format!("unterminated heredoc, expected `{}`", heredoc.tag),
                });
            };
            let terminated = match heredoc.style {
                HeredocStyle::Plain => text.trim_end() == heredoc.tag,
                HeredocStyle::Dash | HeredocStyle::Squiggly => text.trim() == heredoc.tag,
            };
            if terminated {
                break;
            }
            body.push(text);
        }
        Ok(heredoc.render(&body))
    }

    /// Value of a `do ... end` block: a single string or heredoc
    fn block_value(&mut self, line: usize) -> Result<Value, ExecutionError> {
        let syntax = |message: &str| ExecutionError::Syntax {
            line,
            message: message.to_string(),
        };

        let (number, text) = self
            .next_significant_line()
            .ok_or_else(|| syntax("expected a block body"))?;
        let mut cursor = Cursor::new(text);
        cursor.skip_ws();
        let token = cursor
            .token()
            .map_err(|message| ExecutionError::Syntax { line: number, message })?;
        cursor.skip_ws();
        if !cursor.at_end() && cursor.peek() != Some('#') {
            return Err(ExecutionError::Syntax {
                line: number,
                message: format!("unexpected `{}`", cursor.rest().trim()),
            });
        }

        let value = match token {
            Token::Value(value) => value,
            Token::Heredoc(heredoc) => Value::Str(self.heredoc_body(number, &heredoc)?),
        };

        match self.next_significant_line() {
            Some((_, end)) if closes_block(end) => Ok(value),
            _ => Err(syntax("expected `end` to close block")),
        }
    }
}

/// `end`, optionally followed by a comment
fn closes_block(text: &str) -> bool {
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    if !cursor.at_keyword("end") {
        return false;
    }
    cursor.advance("end".len());
    cursor.skip_ws();
    cursor.at_end() || cursor.peek() == Some('#')
}

impl Iterator for Parser<'_> {
    type Item = Result<Statement, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (line, text) = self.next_significant_line()?;
        let result = self.statement(line, text);
        self.failed = result.is_err();
        Some(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeredocStyle {
    /// `<<TAG`, terminator must start the line
    Plain,
    /// `<<-TAG`, terminator may be indented
    Dash,
    /// `<<~TAG`, common indentation is stripped
    Squiggly,
}

#[derive(Debug, Clone)]
struct Heredoc {
    style: HeredocStyle,
    tag: String,
}

impl Heredoc {
    /// Body lines are taken literally, no escapes or interpolation
    fn render(&self, lines: &[&str]) -> String {
        let indent = if self.style == HeredocStyle::Squiggly {
            lines
                .iter()
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
                .min()
                .unwrap_or(0)
        } else {
            0
        };

        let mut out = String::new();
        for line in lines {
            let strip = indent.min(line.len() - line.trim_start_matches([' ', '\t']).len());
            out.push_str(&line[strip..]);
            out.push('\n');
        }
        out
    }
}

enum Token {
    Value(Value),
    Heredoc(Heredoc),
}

/// Character cursor over a single line
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn advance(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.src.len());
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.rest().trim().is_empty()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    fn at_keyword(&self, word: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(word)
            && rest[word.len()..]
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            if c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()) {
                end = i + c.len_utf8();
            } else {
                break;
            }
        }
        if end == 0 {
            return None;
        }
        if matches!(rest[end..].chars().next(), Some('!' | '?')) {
            end += 1;
        }
        self.pos += end;
        Some(&rest[..end])
    }

    fn token(&mut self) -> Result<Token, String> {
        match self.peek() {
            Some('"') => {
                self.bump();
                self.double_quoted().map(|s| Token::Value(Value::Str(s)))
            }
            Some('\'') => {
                self.bump();
                self.single_quoted().map(|s| Token::Value(Value::Str(s)))
            }
            Some(':') => {
                self.bump();
                let name = self.ident().ok_or("expected a symbol name after `:`")?;
                Ok(Token::Value(Value::Symbol(name.to_string())))
            }
            Some('<') if self.rest().starts_with("<<") => {
                self.advance(2);
                self.heredoc().map(Token::Heredoc)
            }
            Some(c) => Err(format!("unexpected `{}`", c)),
            None => Err("expected an argument".to_string()),
        }
    }

    fn double_quoted(&mut self) -> Result<String, String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".to_string()),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err("unterminated string".to_string()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn single_quoted(&mut self) -> Result<String, String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".to_string()),
                Some('\'') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c @ ('\'' | '\\')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err("unterminated string".to_string()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn heredoc(&mut self) -> Result<Heredoc, String> {
        let style = if self.eat('~') {
            HeredocStyle::Squiggly
        } else if self.eat('-') {
            HeredocStyle::Dash
        } else {
            HeredocStyle::Plain
        };

        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.bump();
                Some(q)
            }
            _ => None,
        };
        let tag = self.ident().ok_or("expected a heredoc tag")?.to_string();
        if let Some(q) = quote {
            if !self.eat(q) {
                return Err("unterminated heredoc tag".to_string());
            }
        }

        Ok(Heredoc { style, tag })
    }
}
