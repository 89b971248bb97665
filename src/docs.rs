//! Mod documentation: README text and repository descriptions
//!
//! README Markdown is handled line by line. Only two constructs are
//! recognized: a line starting with `#` is a header, and `[text](http...)`
//! spans are links. Everything else is plain text.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::AppConfig;
use crate::github::GithubRepo;
use crate::logging::log_warning;
use crate::utils::Fetcher;

/// Branches tried, in order, when fetching a README
pub const README_BRANCHES: &[&str] = &["main", "master"];

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\((https?://[^)]+)\)").expect("valid link regex"));

static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("valid shortcode regex"));

/// GitHub shortcodes commonly found in mod descriptions
const EMOJI: &[(&str, &str)] = &[
    ("+1", "👍"),
    ("-1", "👎"),
    ("banana", "🍌"),
    ("bug", "🐛"),
    ("camera", "📷"),
    ("fire", "🔥"),
    ("gorilla", "🦍"),
    ("heart", "❤️"),
    ("joy", "😂"),
    ("monkey", "🐒"),
    ("monkey_face", "🐵"),
    ("rocket", "🚀"),
    ("skull", "💀"),
    ("smile", "😄"),
    ("sparkles", "✨"),
    ("star", "⭐"),
    ("tada", "🎉"),
    ("warning", "⚠️"),
    ("wrench", "🔧"),
    ("x", "❌"),
    ("white_check_mark", "✅"),
];

// ============================================================================
// README Markdown
// ============================================================================

/// A piece of a text line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Link { text: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadmeLine {
    /// The full line, `#` markers included
    Header(String),
    Text(Vec<Span>),
}

/// Split README text into header and text lines
pub fn parse_readme(text: &str) -> Vec<ReadmeLine> {
    text.lines()
        .map(|line| {
            if line.starts_with('#') {
                ReadmeLine::Header(line.to_string())
            } else {
                ReadmeLine::Text(parse_spans(line))
            }
        })
        .collect()
}

fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in LINK_RE.captures_iter(line) {
        let (Some(whole), Some(text), Some(url)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Text(line[last..whole.start()].to_string()));
        }
        spans.push(Span::Link {
            text: text.as_str().to_string(),
            url: url.as_str().to_string(),
        });
        last = whole.end();
    }
    if last < line.len() {
        spans.push(Span::Text(line[last..].to_string()));
    }

    spans
}

/// Fetch a repository's README, trying `main` then `master`
pub fn fetch_readme(fetcher: &dyn Fetcher, config: &AppConfig, repository_id: &str) -> Option<String> {
    for branch in README_BRANCHES {
        let url = config.readme_url(repository_id, branch);
        match fetcher.get(&url) {
            Ok(response) if response.status == 200 => {
                return Some(String::from_utf8_lossy(&response.body).into_owned());
            }
            Ok(response) => {
                log_warning(&format!("README on {} returned HTTP {}", branch, response.status))
            }
            Err(e) => log_warning(&format!("README fetch from {} failed: {}", url, e)),
        }
    }
    None
}

// ============================================================================
// Repository Description
// ============================================================================

/// Replace known `:shortcode:` emoji; unknown codes are left as written
pub fn substitute_emoji(text: &str) -> String {
    SHORTCODE_RE
        .replace_all(text, |caps: &regex::Captures| {
            let code = &caps[1];
            EMOJI
                .iter()
                .find(|(name, _)| *name == code)
                .map(|(_, emoji)| emoji.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Fetch a repository's description with emoji substituted
pub fn fetch_description(
    fetcher: &dyn Fetcher,
    config: &AppConfig,
    repository_id: &str,
) -> Option<String> {
    let url = config.repository_url(repository_id);
    let response = fetcher
        .get(&url)
        .map_err(|e| log_warning(&format!("Repository info for {} failed: {}", repository_id, e)))
        .ok()?;
    if !response.is_success() {
        log_warning(&format!(
            "Repository info for {} returned HTTP {}",
            repository_id, response.status
        ));
        return None;
    }
    let repo: GithubRepo = serde_json::from_slice(&response.body).ok()?;
    Some(substitute_emoji(&repo.description.unwrap_or_default()))
}
