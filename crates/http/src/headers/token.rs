//! Small lexical helpers shared by the structured header values.

/// Splits a header value on commas that are not inside a quoted string.
///
/// Items are trimmed, empty items are dropped.
pub(crate) fn split_list(value: &str) -> Vec<&str> {
    split_outside_quotes(value, b',')
}

/// Same as [`split_list`] but on an arbitrary delimiter, e.g. `;` for cookies.
pub(crate) fn split_outside_quotes(value: &str, delimiter: u8) -> Vec<&str> {
    let bytes = value.as_bytes();
    let mut items = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if quoted => escaped = true,
            b'"' => quoted = !quoted,
            b if b == delimiter && !quoted => {
                push_trimmed(&mut items, &value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_trimmed(&mut items, &value[start..]);
    items
}

fn push_trimmed<'a>(items: &mut Vec<&'a str>, item: &'a str) {
    let item = item.trim();
    if !item.is_empty() {
        items.push(item);
    }
}

/// Removes surrounding double quotes and backslash escapes, if present.
pub(crate) fn unquote(value: &str) -> String {
    let value = value.trim();
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut result = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        result.push(escaped);
                    }
                } else {
                    result.push(c);
                }
            }
            result
        }
        None => value.to_string(),
    }
}

/// Quotes the value unless it is a plain token.
pub(crate) fn quote_if_needed(value: &str) -> String {
    if !value.is_empty() && value.bytes().all(is_tchar) {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// `tchar` from RFC 9110 section 5.6.2.
pub(crate) fn is_tchar(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~') || b.is_ascii_alphanumeric()
}

pub(crate) fn is_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(is_tchar)
}
