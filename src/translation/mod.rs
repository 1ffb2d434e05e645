use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    try_start_dollar_quote,
};
use scanner::{State, scan_index};

/// Placeholder syntax a backend expects for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

impl PlaceholderStyle {
    /// Render the placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn render(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Postgres => format!("${index}"),
            PlaceholderStyle::Sqlite => format!("?{index}"),
        }
    }
}

/// A numbered placeholder found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placeholder {
    /// 1-based parameter number.
    pub(crate) index: usize,
    /// Syntax the placeholder was written in.
    pub(crate) style: PlaceholderStyle,
}

/// Translate placeholders between Postgres-style `$N` and SQLite-style `?N`.
///
/// Quoted strings, comments, and dollar-quoted blocks are skipped. Returns a borrowed `Cow`
/// when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    rewrite_placeholders(sql, |placeholder| {
        (placeholder.style != target).then(|| target.render(placeholder.index))
    })
}

/// Walk `sql` and let `replace` substitute each numbered placeholder outside of literals and
/// comments. Returning `None` keeps the placeholder text unchanged.
pub(crate) fn rewrite_placeholders<F>(sql: &str, mut replace: F) -> Cow<'_, str>
where
    F: FnMut(Placeholder) -> Option<String>,
{
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' | b'?' => {
                    if b == b'$'
                        && let Some((tag, close)) = try_start_dollar_quote(bytes, idx)
                    {
                        state = State::DollarQuoted(tag);
                        idx = close;
                    } else if let Some((end, index)) = scan_index(bytes, idx + 1) {
                        let style = if b == b'$' {
                            PlaceholderStyle::Postgres
                        } else {
                            PlaceholderStyle::Sqlite
                        };
                        if let Some(replacement) = replace(Placeholder { index, style }) {
                            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                            buf.push_str(&sql[copied..idx]);
                            buf.push_str(&replacement);
                            copied = end;
                        }
                        idx = end - 1;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }

        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_sqlite_to_postgres() {
        let sql = "SELECT a FROM t WHERE a = ?1 AND b = ?2";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "SELECT a FROM t WHERE a = $1 AND b = $2");
    }

    #[test]
    fn translates_postgres_to_sqlite() {
        let sql = "INSERT INTO t (a,b) VALUES ($1,$2)";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert_eq!(res, "INSERT INTO t (a,b) VALUES (?1,?2)");
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "SELECT '?1', ?1 -- ?2\n/* ?3 */ FROM t WHERE a = ?1";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "SELECT '?1', $1 -- ?2\n/* ?3 */ FROM t WHERE a = $1");
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "$foo$ SELECT $1 FROM t $foo$ WHERE a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert_eq!(res, "$foo$ SELECT $1 FROM t $foo$ WHERE a = ?1");
    }

    #[test]
    fn same_style_is_borrowed() {
        let sql = "SELECT a FROM t WHERE a = ?1";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert!(matches!(res, Cow::Borrowed(_)));
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let sql = "UPDATE café SET naïve = ?1";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "UPDATE café SET naïve = $1");
    }

    #[test]
    fn rewrite_can_leave_placeholders_untouched() {
        let res = rewrite_placeholders("VALUES (?1,?2,?3)", |p| {
            (p.index == 2).then(|| "'x'".to_string())
        });
        assert_eq!(res, "VALUES (?1,'x',?3)");
    }
}
