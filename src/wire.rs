//! Mapping of raw API bodies into typed records.
//!
//! Field names differ between API versions, so every logical field has a
//! list of aliases tried in order. A missing field is absent, never a crash.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ENVELOPE_KEYS: &[&str] = &["data", "server", "result"];
const LIST_KEYS: &[&str] = &["votes", "data", "items"];

const ID_ALIASES: &[&str] = &["id", "serverId", "server_id"];
const NAME_ALIASES: &[&str] = &["name", "serverName", "title"];
const TOTAL_VOTES_ALIASES: &[&str] = &["votes", "totalVotes", "total_votes", "votesCount"];
const ONLINE_ALIASES: &[&str] = &["online", "onlinePlayers", "players_online", "playersOnline"];
const USERNAME_ALIASES: &[&str] = &["username", "playerName", "player", "nick", "name"];
const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "votedAt", "date", "created_at"];

/// Server metadata keyed by slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    pub total_votes: Option<u64>,
    pub online_players: Option<u64>,
}

/// One entry of a "votes today" list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub username: String,
    pub timestamp: String,
}

impl ServerInfo {
    /// Builds a `ServerInfo` from a response body. `None` when no id alias is present.
    pub fn from_json(body: &Value) -> Option<Self> {
        let obj = unwrap_envelope(body)?;
        let id = first_string(obj, ID_ALIASES)?;
        let name = first_string(obj, NAME_ALIASES).unwrap_or_default();

        Some(Self {
            id,
            name,
            total_votes: first_u64(obj, TOTAL_VOTES_ALIASES),
            online_players: first_u64(obj, ONLINE_ALIASES),
        })
    }
}

impl VoteRecord {
    pub fn from_json(item: &Value) -> Option<Self> {
        let obj = item.as_object()?;
        let username = first_string(obj, USERNAME_ALIASES)?;
        let timestamp = first_string(obj, TIMESTAMP_ALIASES).unwrap_or_default();
        Some(Self { username, timestamp })
    }

    /// Parses a vote list, skipping records without a username.
    pub fn list_from_json(body: &Value) -> Vec<Self> {
        let items = match body {
            Value::Array(items) => Some(items),
            Value::Object(obj) => LIST_KEYS
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_array)),
            _ => None,
        };

        items
            .map(|items| items.iter().filter_map(Self::from_json).collect())
            .unwrap_or_default()
    }
}

/// Descends into a known envelope key when the top-level object has no id.
fn unwrap_envelope(body: &Value) -> Option<&Map<String, Value>> {
    let obj = body.as_object()?;
    if ID_ALIASES.iter().any(|key| obj.contains_key(*key)) {
        return Some(obj);
    }
    ENVELOPE_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_object))
        .or(Some(obj))
}

fn first_string(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_u64(obj: &Map<String, Value>, aliases: &[&str]) -> Option<u64> {
    aliases.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
