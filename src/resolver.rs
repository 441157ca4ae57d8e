use crate::cache::TtlCache;
use crate::client::StatsApi;
use crate::error::ResolverError;
use crate::identity::is_player_placeholder;
use crate::normalize::normalize;
use crate::wire::{ServerInfo, VoteRecord};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answer to "has this player already voted today?"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteCheckResult {
    pub already_voted: bool,
    pub player_votes_on_server: Option<u64>,
    pub server_total_votes: Option<u64>,
}

enum LookupError {
    NotFound,
    Api(ResolverError),
}

/// Pre-check that decides, from the statistics API alone, whether a vote
/// attempt is needed.
///
/// Never fails: any API failure degrades to `already_voted: false` so the
/// caller falls back to attempting the vote in the browser.
pub struct VoteResolver<A: StatsApi> {
    api: Arc<A>,
    servers: TtlCache<ServerInfo>,
    ttl: Duration,
}

impl<A: StatsApi> VoteResolver<A> {
    pub fn new(api: Arc<A>, ttl: Duration) -> Self {
        Self::with_cache(api, TtlCache::new(), ttl)
    }

    pub fn with_cache(api: Arc<A>, servers: TtlCache<ServerInfo>, ttl: Duration) -> Self {
        Self { api, servers, ttl }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Cached server metadata; `None` when unknown or unreachable.
    /// Unknown slugs are not cached.
    pub async fn get_server_info(&self, slug: &str) -> Option<ServerInfo> {
        let key = format!("server:{}", slug);

        let result = self
            .servers
            .get_or_fetch(&key, self.ttl, || async {
                match self.api.fetch_server_info(slug).await {
                    Ok(Some(info)) => Ok(info),
                    Ok(None) => Err(LookupError::NotFound),
                    Err(err) => Err(LookupError::Api(err)),
                }
            })
            .await;

        match result {
            Ok(info) => Some(info),
            Err(LookupError::NotFound) => {
                debug!(slug, "Server response carried no id");
                None
            }
            Err(LookupError::Api(err)) => {
                warn!(slug, error = %err, "Server lookup failed");
                None
            }
        }
    }

    /// Checks today's vote list of `server_slug` for `player_name`.
    pub async fn check_player_voted_today(&self, server_slug: &str, player_name: &str) -> VoteCheckResult {
        if is_player_placeholder(player_name) {
            debug!("No player configured, skipping vote pre-check");
            return VoteCheckResult::default();
        }

        let Some(server) = self.get_server_info(server_slug).await else {
            return VoteCheckResult::default();
        };

        // The vote list moves within the TTL window and is always fetched fresh.
        let votes = match self.api.fetch_votes_today(&server.id).await {
            Ok(votes) => votes,
            Err(err) => {
                warn!(server_id = %server.id, error = %err, "Vote list unavailable, assuming not voted");
                return VoteCheckResult {
                    server_total_votes: server.total_votes,
                    ..VoteCheckResult::default()
                };
            }
        };

        let matching = count_matching_votes(&votes, player_name);
        info!(
            server = %server.name,
            player = player_name,
            matching,
            votes_today = votes.len(),
            "Vote pre-check complete"
        );

        VoteCheckResult {
            already_voted: matching > 0,
            player_votes_on_server: Some(matching),
            server_total_votes: server.total_votes,
        }
    }
}

/// Normalised equality or containment in either direction.
///
/// Containment is deliberately loose: a short name such as `al` also
/// matches `alex`. A name that normalises to nothing matches nothing.
pub fn names_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

pub fn count_matching_votes(votes: &[VoteRecord], player_name: &str) -> u64 {
    votes
        .iter()
        .filter(|vote| names_match(&vote.username, player_name))
        .count() as u64
}
