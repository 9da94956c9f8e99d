use sqlx::mysql::MySqlArguments;

use super::Params;
use crate::error::{AppError, AppResult};

/// A statement written with `:name` placeholders, rewritten for MySQL's
/// positional `?` protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    sql: String,
    names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Quoted(u8),
    LineComment,
    BlockComment,
}

impl NamedQuery {
    /// Scans `sql` once, replacing every `:identifier` outside quotes and
    /// comments with `?` and remembering the identifiers in order.
    pub fn parse(sql: &str) -> Self {
        let bytes = sql.as_bytes();
        let mut out = String::with_capacity(sql.len());
        let mut names = Vec::new();
        let mut state = State::Normal;
        // start of the not-yet-copied run of `sql`
        let mut copied = 0;
        let mut idx = 0;

        while idx < bytes.len() {
            let b = bytes[idx];
            match state {
                State::Normal => match b {
                    b'\'' | b'"' | b'`' => state = State::Quoted(b),
                    b'#' => state = State::LineComment,
                    b'-' if is_line_comment_start(bytes, idx) => state = State::LineComment,
                    b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                        state = State::BlockComment;
                        idx += 1;
                    }
                    b':' if bytes.get(idx + 1) == Some(&b':') => idx += 1,
                    b':' => {
                        let end = scan_identifier(bytes, idx + 1);
                        if end > idx + 1 {
                            out.push_str(&sql[copied..idx]);
                            out.push('?');
                            names.push(sql[idx + 1..end].to_string());
                            copied = end;
                            idx = end;
                            continue;
                        }
                    }
                    _ => {}
                },
                State::Quoted(quote) => {
                    if b == b'\\' {
                        idx += 1;
                    } else if b == quote {
                        // a doubled quote reopens immediately on the next byte
                        state = State::Normal;
                    }
                }
                State::LineComment => {
                    if b == b'\n' {
                        state = State::Normal;
                    }
                }
                State::BlockComment => {
                    if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                        state = State::Normal;
                        idx += 1;
                    }
                }
            }
            idx += 1;
        }

        out.push_str(&sql[copied..]);
        Self { sql: out, names }
    }

    /// The rewritten statement text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in binding order, repeats included
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolves every placeholder against `params`, in statement order
    pub fn bind(&self, params: &Params) -> AppResult<MySqlArguments> {
        let mut args = MySqlArguments::default();
        for name in &self.names {
            let value = params.get(name).ok_or_else(|| {
                AppError::Internal(format!("no value bound for placeholder :{}", name))
            })?;
            value.add_to(&mut args)?;
        }
        Ok(args)
    }
}

/// MySQL only treats `--` as a comment when followed by whitespace
fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx + 1) == Some(&b'-')
        && bytes
            .get(idx + 2)
            .map_or(true, |c| c.is_ascii_whitespace())
}

fn scan_identifier(bytes: &[u8], start: usize) -> usize {
    match bytes.get(start) {
        Some(c) if c.is_ascii_alphabetic() || *c == b'_' => {}
        _ => return start,
    }
    let mut end = start + 1;
    while bytes
        .get(end)
        .is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_')
    {
        end += 1;
    }
    end
}
