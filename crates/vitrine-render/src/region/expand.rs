//! Source rewrite for the `region` / `renderregion` tags.
//!
//! MiniJinja has no hook for custom block tags, so the tags are rewritten into
//! plain template syntax before the source reaches the parser. Everything else
//! (text, `{{ }}` expressions, comments, `{% raw %}` sections and other block
//! tags) is copied through byte for byte.
//!
//! ```text
//! {% region "sidebar" %}BODY{% endregion %}
//!   => {% if __regions.reserve("sidebar") %}{% set __region_0 %}BODY{% endset %}
//!      {{ __regions.capture("sidebar", __region_0) }}{% endif %}
//!
//! {% renderregion "sidebar" "none" %}
//!   => {% if true %}{{ __regions.render("sidebar", "none") }}{% endif %}
//! ```
//!
//! `renderregion` takes a name and an optional fallback, separated by a comma
//! or by whitespace. The `reserve` guard means a block for a name that is
//! already captured, or claimed by an enclosing block, never evaluates its
//! body. Rewritten tags keep the whitespace control markers of the originals,
//! and each replacement starts and ends with a block tag so
//! `trim_blocks`/`lstrip_blocks` behave as they would for the original tag.
//! Newlines inside an original tag are kept inside the replacement's last tag,
//! so line numbers after it stay the same.

use std::fmt;

use super::map::REGIONS_VAR;

/// Misuse of the region tags, found while rewriting a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSyntaxError {
    /// 1-based line of the offending tag.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for RegionSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

impl std::error::Error for RegionSyntaxError {}

/// A `{% ... %}` tag located in the source.
struct BlockTag<'a> {
    /// Whitespace marker right after `{%` (`-` or `+`), if any.
    open_marker: &'a str,
    /// Whitespace marker right before `%}`, if any.
    close_marker: &'a str,
    /// Tag name (first word).
    name: &'a str,
    /// Everything after the name, trimmed.
    args: &'a str,
    /// Byte offset just past the closing `%}`.
    end: usize,
}

/// Line counter that only scans forward.
struct LineTracker<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
        }
    }

    /// 1-based line of `offset`, which must not be before the last query.
    fn line_at(&mut self, offset: usize) -> usize {
        self.line += newlines(&self.source[self.offset..offset]);
        self.offset = offset;
        self.line
    }
}

/// Rewrites region tags in `source` into plain template syntax.
pub fn expand_region_tags(source: &str) -> Result<String, RegionSyntaxError> {
    let mut out = String::with_capacity(source.len() + 64);
    let mut open: Vec<(String, usize, usize)> = Vec::new();
    let mut lines = LineTracker::new(source);
    let mut counter = 0usize;
    let mut pos = 0usize;

    while let Some(offset) = source[pos..].find('{') {
        let start = pos + offset;
        let rest = &source[start..];

        if rest.starts_with("{{") {
            let end = find_close(source, start + 2, "}}").unwrap_or(source.len());
            out.push_str(&source[pos..end]);
            pos = end;
            continue;
        }
        if rest.starts_with("{#") {
            let end = source[start + 2..]
                .find("#}")
                .map(|i| start + 2 + i + 2)
                .unwrap_or(source.len());
            out.push_str(&source[pos..end]);
            pos = end;
            continue;
        }
        if !rest.starts_with("{%") {
            out.push_str(&source[pos..start + 1]);
            pos = start + 1;
            continue;
        }

        let Some(tag) = parse_block_tag(source, start) else {
            // Unterminated tag: leave it for the template parser to report.
            out.push_str(&source[pos..]);
            pos = source.len();
            break;
        };

        out.push_str(&source[pos..start]);
        let original = &source[start..tag.end];
        let line = lines.line_at(start);
        let error = |message: String| RegionSyntaxError { line, message };

        let replacement = match tag.name {
            "raw" => {
                let end = find_endraw(source, tag.end).unwrap_or(source.len());
                out.push_str(&source[start..end]);
                pos = end;
                continue;
            }
            "region" => {
                let args = split_arguments(tag.args)
                    .map_err(|m| error(format!("{} tag: {}", tag.name, m)))?;
                let name = match args.as_slice() {
                    [name] => name.to_string(),
                    [] => return Err(error("region tag requires a name".into())),
                    _ => return Err(error("region tag takes a single name".into())),
                };
                let var = format!("__region_{}", counter);
                counter += 1;
                let head = format!(
                    "{{%{} if {}.reserve({}) %}}{{% set {} ",
                    tag.open_marker, REGIONS_VAR, name, var
                );
                open.push((name, counter - 1, line));
                head
            }
            "endregion" => {
                let Some((name, index, _)) = open.pop() else {
                    return Err(error("endregion without a matching region".into()));
                };
                format!(
                    "{{%{} endset %}}{{{{ {}.capture({}, __region_{}) }}}}{{% endif ",
                    tag.open_marker, REGIONS_VAR, name, index
                )
            }
            "renderregion" => {
                let args = split_arguments(tag.args)
                    .map_err(|m| error(format!("{} tag: {}", tag.name, m)))?;
                let call = match args.as_slice() {
                    [name] => name.to_string(),
                    [name, fallback] => format!("{}, {}", name, fallback),
                    [] => return Err(error("renderregion tag requires a name".into())),
                    _ => {
                        return Err(error(
                            "renderregion takes a name and at most one fallback".into(),
                        ))
                    }
                };
                format!(
                    "{{%{} if true %}}{{{{ {}.render({}) }}}}{{% endif ",
                    tag.open_marker, REGIONS_VAR, call
                )
            }
            _ => {
                out.push_str(original);
                pos = tag.end;
                continue;
            }
        };

        out.push_str(&replacement);
        for _ in newlines(&replacement)..newlines(original) {
            out.push('\n');
        }
        out.push_str(tag.close_marker);
        out.push_str("%}");
        pos = tag.end;
    }

    if let Some((name, _, line)) = open.last() {
        return Err(RegionSyntaxError {
            line: *line,
            message: format!("region {} is never closed with endregion", name),
        });
    }

    out.push_str(&source[pos..]);
    Ok(out)
}

/// Splits tag arguments into top-level expressions.
///
/// Expressions are separated by a comma, or by whitespace between a complete
/// operand and the start of a new one (`"name" "fallback"`). Commas and spaces
/// inside strings or brackets don't count.
fn split_arguments(args: &str) -> Result<Vec<&str>, String> {
    let bytes = args.as_bytes();
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                push_argument(&mut parts, &args[start..i])?;
                start = i + 1;
            }
            b if depth == 0 && b.is_ascii_whitespace() => {
                let next = args[i..]
                    .find(|c: char| !c.is_whitespace())
                    .map_or(args.len(), |n| i + n);
                if next < args.len()
                    && ends_operand(&args[start..i])
                    && starts_operand(&args[next..])
                {
                    push_argument(&mut parts, &args[start..i])?;
                    start = next;
                }
                i = next;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if quote.is_some() || depth != 0 {
        return Err("unbalanced quotes or brackets in arguments".to_string());
    }
    if !args[start..].trim().is_empty() || !parts.is_empty() {
        push_argument(&mut parts, &args[start..])?;
    }
    Ok(parts)
}

fn push_argument<'a>(parts: &mut Vec<&'a str>, piece: &'a str) -> Result<(), String> {
    let piece = piece.trim();
    if piece.is_empty() {
        return Err("empty argument".to_string());
    }
    parts.push(piece);
    Ok(())
}

/// Words that continue an expression rather than start a new one.
const OPERATOR_WORDS: &[&str] = &["and", "or", "not", "in", "is", "if", "else"];

fn ends_operand(piece: &str) -> bool {
    let piece = piece.trim_end();
    let Some(last) = piece.chars().last() else {
        return false;
    };
    if matches!(last, '"' | '\'' | ')' | ']' | '}') {
        return true;
    }
    let word_start = piece
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = &piece[word_start..];
    !word.is_empty() && !OPERATOR_WORDS.contains(&word)
}

fn starts_operand(rest: &str) -> bool {
    let Some(first) = rest.chars().next() else {
        return false;
    };
    if matches!(first, '"' | '\'') || first.is_ascii_digit() {
        return true;
    }
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    let word_end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    !OPERATOR_WORDS.contains(&&rest[..word_end])
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Parses the block tag starting at `start` (which points at `{%`).
fn parse_block_tag(source: &str, start: usize) -> Option<BlockTag<'_>> {
    let inner_start = start + 2;
    let close = find_close(source, inner_start, "%}")?;
    let inner_end = close - 2;
    let mut inner = &source[inner_start..inner_end];

    let mut open_marker = "";
    if let Some(stripped) = inner.strip_prefix(['-', '+']) {
        open_marker = &inner[..1];
        inner = stripped;
    }
    let mut close_marker = "";
    if let Some(stripped) = inner.strip_suffix(['-', '+']) {
        close_marker = &inner[inner.len() - 1..];
        inner = stripped;
    }

    let inner = inner.trim();
    let (name, args) = match inner.find(char::is_whitespace) {
        Some(i) => (&inner[..i], inner[i..].trim()),
        None => (inner, ""),
    };

    Some(BlockTag {
        open_marker,
        close_marker,
        name,
        args,
        end: close,
    })
}

/// Finds the byte offset just past `delim`, skipping quoted strings.
fn find_close(source: &str, from: usize, delim: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    quote = Some(b);
                } else if bytes[i..].starts_with(delim.as_bytes()) {
                    return Some(i + delim.len());
                }
            }
        }
        i += 1;
    }
    None
}

/// Offset just past the `{% endraw %}` tag that closes a raw section.
fn find_endraw(source: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(offset) = source[pos..].find("{%") {
        let start = pos + offset;
        let tag = parse_block_tag(source, start)?;
        if tag.name == "endraw" {
            return Some(tag.end);
        }
        pos = start + 2;
    }
    None
}
