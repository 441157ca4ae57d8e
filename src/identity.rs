//! Player and server identity as configured by the operator.

use crate::config::Config;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Shown when no player name is configured; never matched against votes.
pub const PLAYER_PLACEHOLDER: &str = "InserisciNick";
/// Shown when neither a server name nor a parsable server URL is configured.
pub const SERVER_PLACEHOLDER: &str = "ImpostaServer";

const PLAYER_NAME_MAX_CHARS: usize = 30;
const SERVER_NAME_MAX_CHARS: usize = 50;

static SERVER_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/server/([^/?#]+)").expect("valid server slug pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerIdentity {
    pub name: String,
}

impl PlayerIdentity {
    pub fn new(raw: Option<&str>) -> Self {
        let name = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| truncate_chars(s, PLAYER_NAME_MAX_CHARS))
            .unwrap_or_else(|| PLAYER_PLACEHOLDER.to_string());
        Self { name }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.player_name.as_deref())
    }

    pub fn is_placeholder(&self) -> bool {
        is_player_placeholder(&self.name)
    }
}

/// True for an empty name or the unconfigured placeholder.
pub fn is_player_placeholder(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == PLAYER_PLACEHOLDER
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerIdentity {
    /// Display name
    pub name: String,
    /// API slug, when the server URL carries one
    pub slug: Option<String>,
}

impl ServerIdentity {
    pub fn new(name: Option<&str>, url: Option<&str>) -> Self {
        let slug = url.and_then(slug_from_url);

        let name = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| truncate_chars(s, SERVER_NAME_MAX_CHARS))
            .or_else(|| slug.as_deref().map(display_name_from_slug))
            .unwrap_or_else(|| SERVER_PLACEHOLDER.to_string());

        Self { name, slug }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server_name.as_deref(), config.server_url.as_deref())
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == SERVER_PLACEHOLDER
    }
}

/// Extracts `<slug>` from `https://host/server/<slug>?...`.
pub fn slug_from_url(url: &str) -> Option<String> {
    SERVER_SLUG
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `my-cool_server` becomes `My Cool Server`.
pub fn display_name_from_slug(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    truncate_chars(&out, SERVER_NAME_MAX_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
