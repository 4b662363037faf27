//! Console expression parser.
//!
//! A line is either a dotted path read (`data.scene.camera.zoom`) or a call
//! (`ops.scene.select("node-1", true)`). Call arguments are JSON values, so
//! strings use double quotes and objects/arrays are written as JSON.

use crate::error::ConsoleError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(Vec<String>),
    Call { target: Vec<String>, args: Vec<Value> },
}

impl Expr {
    pub fn target(&self) -> &[String] {
        match self {
            Expr::Path(path) => path,
            Expr::Call { target, .. } => target,
        }
    }
}

/// Parses one console line. A leading `<root_name>.` prefix is optional.
pub fn parse(line: &str, root_name: &str) -> Result<Expr, ConsoleError> {
    let line = line.trim().trim_end_matches(';').trim_end();
    if line.is_empty() {
        return Err(ConsoleError::Parse {
            column: 1,
            message: "empty expression".into(),
        });
    }

    let (head, args) = match line.find('(') {
        Some(open) => {
            if !line.ends_with(')') {
                return Err(ConsoleError::Parse {
                    column: line.chars().count() + 1,
                    message: "expected ')' at end of call".into(),
                });
            }
            let inner = &line[open + 1..line.len() - 1];
            let head = &line[..open];
            (head, Some(parse_args(inner, head.chars().count() + 1)?))
        }
        None => (line, None),
    };

    let mut path = parse_path(head.trim_end())?;
    if path.len() > 1 && path[0] == root_name {
        path.remove(0);
    } else if path.len() == 1 && path[0] == root_name {
        path.clear();
    }

    Ok(match args {
        Some(args) => Expr::Call { target: path, args },
        None => Expr::Path(path),
    })
}

fn parse_path(head: &str) -> Result<Vec<String>, ConsoleError> {
    let mut segments = Vec::new();
    let mut column = 1;
    for seg in head.split('.') {
        if seg.is_empty() {
            return Err(ConsoleError::Parse {
                column,
                message: "empty path segment".into(),
            });
        }
        if let Some(bad) = seg.chars().position(|c| !is_segment_char(c)) {
            return Err(ConsoleError::Parse {
                column: column + bad,
                message: format!("unexpected character in '{seg}'"),
            });
        }
        segments.push(seg.to_string());
        column += seg.chars().count() + 1;
    }
    Ok(segments)
}

fn is_segment_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '-')
}

/// Parses a comma-separated JSON argument list. `offset` is the column of
/// the first character after `(`, for error reporting.
fn parse_args(inner: &str, offset: usize) -> Result<Vec<Value>, ConsoleError> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<Value>>(&format!("[{inner}]")).map_err(|e| ConsoleError::Parse {
        // The wrapping '[' shifts serde's column by one.
        column: offset + e.column().saturating_sub(1),
        message: format!("invalid arguments: {e}"),
    })
}

/// Splits a dotted path argument (`"camera.zoom"`) or a JSON array of
/// segments (`["items", "0"]`) into path segments.
pub fn path_arg(value: &Value) -> Result<Vec<String>, ConsoleError> {
    let invalid = || ConsoleError::Parse {
        column: 1,
        message: format!("expected a dotted path or array of segments, got {value}"),
    };
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.split('.').map(str::to_string).collect()),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}
