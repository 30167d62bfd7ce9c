//! A declarative classic-script engine.
//!
//! `DeclarativeEngine` understands the subset of JavaScript that resource
//! scripts use to publish globals: plain and `window.`-qualified assignments of
//! literal values, references to other globals, and numeric counters. It is a
//! stand-in for a full engine behind the `JsEngine` trait.

use crate::globals::Window;
use crate::values::JSValue;
use crate::JsEngine;
use anyhow::{anyhow, bail, Result};
use log::{debug, error};
use serde_json::Value;

/// Prefixes that address the global object explicitly.
const GLOBAL_QUALIFIERS: [&str; 3] = ["window.", "globalThis.", "self."];

/// Declaration keywords stripped before an assignment.
const DECLARATION_KEYWORDS: [&str; 3] = ["var ", "let ", "const "];

/// Engine that executes global assignment statements against a `Window`.
pub struct DeclarativeEngine {
    window: Window,
    scripts_run: u64,
}

impl DeclarativeEngine {
    /// Create an engine bound to the given global scope.
    pub fn new(window: Window) -> Self {
        Self {
            window,
            scripts_run: 0,
        }
    }

    /// Number of scripts evaluated so far, including failed ones.
    pub const fn scripts_run(&self) -> u64 {
        self.scripts_run
    }

    /// Execute a single statement.
    fn execute(&self, statement: &str) -> Result<()> {
        let statement = strip_declaration(statement.trim());
        if let Some(target) = statement.strip_suffix("++") {
            return self.adjust(target, 1.0);
        }
        if let Some(target) = statement.strip_suffix("--") {
            return self.adjust(target, -1.0);
        }
        if let Some((target, amount)) = statement.split_once("+=") {
            let delta = self.evaluate(amount)?.to_number();
            return self.adjust(target, delta);
        }
        if let Some((target, amount)) = statement.split_once("-=") {
            let delta = self.evaluate(amount)?.to_number();
            return self.adjust(target, -delta);
        }
        let Some((target, expression)) = split_assignment(statement) else {
            bail!("unsupported statement `{statement}`");
        };
        let name = global_name(target)?;
        let value = self.evaluate(expression)?;
        debug!("DeclarativeEngine: {name} = {value}");
        self.window.set(name, value);
        Ok(())
    }

    /// Add `delta` to a global, treating an unset global as zero.
    fn adjust(&self, target: &str, delta: f64) -> Result<()> {
        let name = global_name(target)?;
        self.window.with_mut(|scope| {
            let current = scope.get(name).to_number();
            scope.set(name, JSValue::Number(current + delta));
        });
        Ok(())
    }

    /// Evaluate the right-hand side of an assignment.
    fn evaluate(&self, expression: &str) -> Result<JSValue> {
        let expression = expression.trim();
        match expression {
            "" => bail!("missing expression"),
            "undefined" => return Ok(JSValue::Undefined),
            "NaN" => return Ok(JSValue::Number(f64::NAN)),
            _ => {}
        }
        if let Some(inner) = expression
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
        {
            return Ok(JSValue::String(inner.replace("\\'", "'")));
        }
        if let Ok(literal) = serde_json::from_str::<Value>(expression) {
            return Ok(JSValue::from(literal));
        }
        let name = global_name(expression)
            .map_err(|_| anyhow!("unsupported expression `{expression}`"))?;
        let scope_has = self.window.with(|scope| scope.contains(name));
        if !scope_has {
            bail!("ReferenceError: {name} is not defined");
        }
        Ok(self.window.get(name))
    }
}

impl JsEngine for DeclarativeEngine {
    fn eval_script(&mut self, source: &str, url: &str) -> Result<()> {
        self.scripts_run = self.scripts_run.saturating_add(1);
        for statement in split_statements(source) {
            if let Err(err) = self.execute(&statement) {
                error!("[JS]: Uncaught {err} ({url})");
                return Err(err.context(format!("uncaught error in {url}")));
            }
        }
        Ok(())
    }

    fn run_jobs(&mut self) -> Result<()> {
        // Statements run synchronously; there is never a pending job.
        Ok(())
    }

    fn window(&self) -> &Window {
        &self.window
    }
}

/// Drop a leading `var`/`let`/`const`.
fn strip_declaration(statement: &str) -> &str {
    DECLARATION_KEYWORDS
        .iter()
        .find_map(|keyword| statement.strip_prefix(keyword))
        .unwrap_or(statement)
}

/// Split `target = expression` on the first bare `=` (not `==`, `=>`, `<=`...).
fn split_assignment(statement: &str) -> Option<(&str, &str)> {
    let bytes = statement.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte != b'=' {
            continue;
        }
        let previous = index.checked_sub(1).and_then(|prev| bytes.get(prev));
        let next = bytes.get(index.saturating_add(1));
        if matches!(previous, Some(b'=' | b'!' | b'<' | b'>'))
            || matches!(next, Some(b'=' | b'>'))
        {
            return None;
        }
        return Some((statement.get(..index)?, statement.get(index.saturating_add(1)..)?));
    }
    None
}

/// Resolve an assignment target to a global variable name.
fn global_name(target: &str) -> Result<&str> {
    let target = target.trim();
    let name = GLOBAL_QUALIFIERS
        .iter()
        .find_map(|qualifier| target.strip_prefix(qualifier))
        .unwrap_or(target);
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(anyhow!("invalid assignment target `{target}`"))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|character| character.is_alphanumeric() || character == '_' || character == '$')
}

/// Split source text into statements on `;` and newlines at nesting depth zero,
/// skipping comments and keeping string literals intact.
fn split_statements(source: &str) -> Vec<String> {
    let mut statements: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut chars = source.chars().peekable();
    while let Some(character) = chars.next() {
        if let Some(open) = quote {
            current.push(character);
            if character == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if character == open {
                quote = None;
            }
            continue;
        }
        match character {
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
                flush_statement(&mut current, &mut statements, depth);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut last = '\0';
                for skipped in chars.by_ref() {
                    if last == '*' && skipped == '/' {
                        break;
                    }
                    last = skipped;
                }
            }
            '"' | '\'' => {
                quote = Some(character);
                current.push(character);
            }
            '{' | '[' | '(' => {
                depth = depth.saturating_add(1);
                current.push(character);
            }
            '}' | ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(character);
            }
            ';' | '\n' if depth == 0 => flush_statement(&mut current, &mut statements, depth),
            _ => current.push(character),
        }
    }
    flush_statement(&mut current, &mut statements, 0);
    statements
}

fn flush_statement(current: &mut String, statements: &mut Vec<String>, depth: usize) {
    if depth > 0 {
        return;
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_owned());
    }
    current.clear();
}
