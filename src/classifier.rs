//! Outcome classification for one vote attempt.
//!
//! The automation layer clicks "+1", reads back the page text and the labels
//! of the clickable controls, and hands both here. Rules are evaluated in a
//! fixed order and the first one that fires decides the outcome:
//!
//! 1. the text contains an "already voted" phrase → [`VoteOutcome::AlreadyVoted`]
//! 2. a control label contains the confirm keyword → [`VoteOutcome::Submitted`]
//! 3. otherwise → [`VoteOutcome::Unrecognized`]
//!
//! Pages can show the "already voted" notice next to a live vote button, so
//! rule 1 must stay ahead of rule 2.

use crate::normalize::fold_text;
use serde::Serialize;
use std::fmt;

/// "Already voted" notices, already folded (lowercase, no diacritics).
pub const ALREADY_VOTED_PHRASES: &[&str] = &[
    "gia fatto",
    "gia votato",
    "hai gia votato",
    "gia stato registrato",
    "already voted",
];

/// Keyword identifying the control that confirms the vote.
pub const CONFIRM_KEYWORD: &str = "vota";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VoteOutcome {
    AlreadyVoted,
    Submitted,
    Unrecognized,
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteOutcome::AlreadyVoted => write!(f, "already voted"),
            VoteOutcome::Submitted => write!(f, "submitted"),
            VoteOutcome::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// The outcome plus what caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub outcome: VoteOutcome,
    /// Phrase that fired rule 1
    pub matched_phrase: Option<&'static str>,
    /// Index into the supplied labels of the control the caller should click
    pub confirm_control: Option<usize>,
}

impl Classification {
    fn unrecognized() -> Self {
        Self {
            outcome: VoteOutcome::Unrecognized,
            matched_phrase: None,
            confirm_control: None,
        }
    }
}

/// A single ordered rule.
struct Rule {
    name: &'static str,
    apply: fn(&str, &[String]) -> Option<Classification>,
}

const RULES: &[Rule] = &[
    Rule {
        name: "already-voted-phrase",
        apply: already_voted_rule,
    },
    Rule {
        name: "confirm-control",
        apply: confirm_control_rule,
    },
];

fn already_voted_rule(folded_text: &str, _labels: &[String]) -> Option<Classification> {
    ALREADY_VOTED_PHRASES
        .iter()
        .copied()
        .find(|phrase| folded_text.contains(phrase))
        .map(|phrase| Classification {
            outcome: VoteOutcome::AlreadyVoted,
            matched_phrase: Some(phrase),
            confirm_control: None,
        })
}

fn confirm_control_rule(_folded_text: &str, folded_labels: &[String]) -> Option<Classification> {
    folded_labels
        .iter()
        .position(|label| label.contains(CONFIRM_KEYWORD))
        .map(|index| Classification {
            outcome: VoteOutcome::Submitted,
            matched_phrase: None,
            confirm_control: Some(index),
        })
}

/// Applies the rules in order. Total over all inputs; never touches the network.
pub fn classify<S: AsRef<str>>(page_text: &str, control_labels: &[S]) -> Classification {
    let folded_text = fold_text(page_text);
    let folded_labels: Vec<String> = control_labels
        .iter()
        .map(|label| fold_text(label.as_ref()))
        .collect();

    RULES
        .iter()
        .find_map(|rule| {
            let hit = (rule.apply)(&folded_text, &folded_labels)?;
            tracing::debug!(rule = rule.name, outcome = %hit.outcome, "Classification rule fired");
            Some(hit)
        })
        .unwrap_or_else(Classification::unrecognized)
}

pub fn classify_outcome<S: AsRef<str>>(page_text: &str, control_labels: &[S]) -> VoteOutcome {
    classify(page_text, control_labels).outcome
}

/// Lifecycle of one vote attempt: `Clicked`, then `Inspected` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptPhase {
    Clicked,
    Inspected(VoteOutcome),
}

#[derive(Debug, Clone, Default)]
pub struct VoteAttempt {
    classification: Option<Classification>,
}

impl VoteAttempt {
    /// Starts an attempt right after the "+1" click.
    pub fn clicked() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AttemptPhase {
        match &self.classification {
            Some(classification) => AttemptPhase::Inspected(classification.outcome),
            None => AttemptPhase::Clicked,
        }
    }

    /// Classifies the page. Later calls return the first classification.
    pub fn inspect<S: AsRef<str>>(&mut self, page_text: &str, control_labels: &[S]) -> &Classification {
        self.classification
            .get_or_insert_with(|| classify(page_text, control_labels))
    }

    pub fn outcome(&self) -> Option<VoteOutcome> {
        self.classification.as_ref().map(|c| c.outcome)
    }
}
