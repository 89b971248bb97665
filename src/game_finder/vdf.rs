//! `libraryfolders.vdf` reader
//!
//! Only the library paths are needed. Both layouts Steam has written are read:
//! `"N" { "path" "<dir>" ... }` blocks and the older flat `"N" "<dir>"` pairs.

#[derive(Debug, PartialEq)]
enum Token {
    Str(String),
    Open,
    Close,
}

/// Split the file into quoted strings and braces; `None` on an unterminated string
fn tokenize(content: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = content;

    loop {
        rest = rest.trim_start();
        if rest.starts_with("//") {
            rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
            continue;
        }

        let Some(first) = rest.chars().next() else {
            return Some(tokens);
        };
        match first {
            '{' => tokens.push(Token::Open),
            '}' => tokens.push(Token::Close),
            '"' => {
                let body = &rest[1..];
                let end = closing_quote(body)?;
                // Windows paths are written with doubled backslashes
                tokens.push(Token::Str(body[..end].replace("\\\\", "\\")));
                rest = &body[end + 1..];
                continue;
            }
            _ => {}
        }
        rest = &rest[first.len_utf8()..];
    }
}

fn closing_quote(body: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

/// Library paths from `libraryfolders.vdf`, ordered by their numeric key.
///
/// Malformed or unbalanced content yields an empty list.
pub fn parse_library_folders(content: &str) -> Vec<String> {
    let Some(tokens) = tokenize(content) else {
        return Vec::new();
    };

    let mut folders: Vec<(u32, String)> = Vec::new();
    let mut depth = 0usize;
    let mut in_library_folders = false;
    // key of the current `"N" { ... }` block
    let mut index: Option<u32> = None;
    let mut pending_key: Option<&str> = None;

    for token in &tokens {
        match token {
            Token::Open => {
                let key = pending_key.take();
                depth += 1;
                match depth {
                    1 => {
                        in_library_folders =
                            key.is_some_and(|k| k.eq_ignore_ascii_case("libraryfolders"))
                    }
                    2 => index = key.and_then(|k| k.parse().ok()),
                    _ => {}
                }
            }
            Token::Close => {
                if depth == 0 {
                    return Vec::new();
                }
                depth -= 1;
                if depth < 2 {
                    index = None;
                }
                pending_key = None;
            }
            Token::Str(value) => {
                let Some(key) = pending_key.take() else {
                    pending_key = Some(value.as_str());
                    continue;
                };
                if !in_library_folders {
                    continue;
                }
                match (depth, index) {
                    (1, _) => {
                        if let Ok(n) = key.parse() {
                            folders.push((n, value.clone()));
                        }
                    }
                    (2, Some(n)) if key == "path" => folders.push((n, value.clone())),
                    _ => {}
                }
            }
        }
    }

    if depth != 0 {
        return Vec::new();
    }

    folders.sort_by_key(|(n, _)| *n);
    folders.into_iter().map(|(_, path)| path).collect()
}
