//! Shortcode tag tokenizer.
//!
//! Parses one tag, `{{< name arg "quoted arg" key="value" >}}` or
//! `{{< /name >}}`, starting at the opening delimiter.

/// Opening tag delimiter.
pub(crate) const OPEN: &str = "{{<";
/// Closing tag delimiter.
pub(crate) const CLOSE: &str = ">}}";

/// One whitespace-separated argument token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Bare word or quoted string.
    Positional(String),
    /// `key=value` or `key="value"`.
    Keyword(String, String),
}

/// A parsed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    pub name: String,
    pub closing: bool,
    pub tokens: Vec<Token>,
}

impl Tag {
    /// Split tokens into positional values and keyword pairs, keeping order.
    pub fn into_arguments(self) -> (Vec<String>, Vec<(String, String)>) {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        for token in self.tokens {
            match token {
                Token::Positional(value) => positional.push(value),
                Token::Keyword(key, value) => named.push((key, value)),
            }
        }
        (positional, named)
    }
}

/// Parse the tag at the start of `s`.
///
/// Returns the tag and the number of bytes it spans, including both
/// delimiters. Errors are human-readable messages.
pub(crate) fn parse_tag(s: &str) -> Result<(Tag, usize), String> {
    let mut rest = s
        .strip_prefix(OPEN)
        .ok_or_else(|| format!("expected `{OPEN}`"))?
        .trim_start();

    let closing = match rest.strip_prefix('/') {
        Some(after) => {
            rest = after.trim_start();
            true
        }
        None => false,
    };

    let name_len = rest
        .find(|c: char| !is_name_char(c))
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    if name.is_empty() {
        return Err("missing shortcode name".to_owned());
    }
    rest = &rest[name_len..];

    let mut tokens = Vec::new();
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix(CLOSE) {
            rest = after;
            break;
        }
        if trimmed.is_empty() {
            return Err(format!("missing closing `{CLOSE}`"));
        }
        if trimmed.len() == rest.len() {
            return Err(format!("expected whitespace before `{}`", preview(trimmed)));
        }
        let (token, after) = parse_token(trimmed)?;
        tokens.push(token);
        rest = after;
    }

    if closing && !tokens.is_empty() {
        return Err(format!("closing tag `/{name}` takes no arguments"));
    }

    let tag = Tag {
        name: name.to_owned(),
        closing,
        tokens,
    };
    Ok((tag, s.len() - rest.len()))
}

/// Parse one token at the start of `s` (no leading whitespace).
fn parse_token(s: &str) -> Result<(Token, &str), String> {
    if let Some(quoted) = s.strip_prefix('"') {
        let (value, rest) = parse_quoted(quoted)?;
        return Ok((Token::Positional(value), rest));
    }

    let end = bare_word_end(s);
    let word = &s[..end];
    let rest = &s[end..];

    if word.contains(OPEN) {
        return Err(format!("missing closing `{CLOSE}`"));
    }

    if let Some((key, value)) = word.split_once('=')
        && !key.is_empty()
        && key.chars().all(is_name_char)
    {
        if value.is_empty()
            && let Some(quoted) = rest.strip_prefix('"')
        {
            let (value, rest) = parse_quoted(quoted)?;
            return Ok((Token::Keyword(key.to_owned(), value), rest));
        }
        if rest.starts_with('"') {
            return Err(format!("unexpected quote after `{word}`"));
        }
        return Ok((Token::Keyword(key.to_owned(), value.to_owned()), rest));
    }

    if rest.starts_with('"') {
        return Err(format!("unexpected quote after `{word}`"));
    }
    Ok((Token::Positional(word.to_owned()), rest))
}

/// Parse a double-quoted string body (after the opening quote).
///
/// `\"` and `\\` are escapes; any other backslash is kept literally.
fn parse_quoted(s: &str) -> Result<(String, &str), String> {
    let mut value = String::new();
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            '"' => return Ok((value, &s[i + 1..])),
            _ => value.push(c),
        }
    }

    Err("unterminated quoted string".to_owned())
}

/// Byte length of the bare word at the start of `s`.
///
/// A bare word stops at whitespace, a double quote, or the closing delimiter.
fn bare_word_end(s: &str) -> usize {
    for (i, c) in s.char_indices() {
        if c.is_whitespace() || c == '"' || s[i..].starts_with(CLOSE) {
            return i;
        }
    }
    s.len()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// First few characters of `s`, for error messages.
fn preview(s: &str) -> String {
    s.chars().take(12).collect()
}
