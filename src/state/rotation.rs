//! Painter rotation: who draws next, and the per-lobby state that remembers the current cycle.
//!
//! [`select_next`] is a pure function of the roster and the stored [`RotationState`]. Every
//! resolvable player paints exactly once per cycle; once the history covers the whole roster a
//! new cycle starts from the first member. Continuity across calls comes from starting the
//! scan right after the last painter's position.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::roster::RosterView;

/// Stable, opaque identifier of a player in the rotation (the player's auth token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(String);

impl PlayerToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlayerToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PlayerToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for PlayerToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rotation fields owned by a lobby.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationState {
    /// Player currently painting, if any.
    pub current_painter: Option<PlayerToken>,
    /// Players that already painted in the current cycle, in selection order.
    pub history: IndexSet<PlayerToken>,
}

impl RotationState {
    /// Forget the current painter and the cycle history.
    pub fn reset(&mut self) {
        self.current_painter = None;
        self.history.clear();
    }

    /// Whether no painter was selected since the last reset.
    pub fn is_empty(&self) -> bool {
        self.current_painter.is_none() && self.history.is_empty()
    }
}

/// Degenerate rosters for which no painter can be chosen.
///
/// Callers must reset the lobby's [`RotationState`] when they receive either variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RotationError {
    /// The lobby has no members at all.
    #[error("lobby has no players")]
    EmptyRoster,
    /// The lobby lists members but none of them resolves to a live user.
    #[error("none of the lobby players could be resolved")]
    NoResolvableMembers,
}

/// Choose the next painter for `roster` and return it together with the updated state.
pub fn select_next(
    roster: &RosterView,
    state: &RotationState,
) -> Result<(PlayerToken, RotationState), RotationError> {
    let members = roster.members();
    if members.is_empty() {
        return Err(if roster.listed() == 0 {
            RotationError::EmptyRoster
        } else {
            RotationError::NoResolvableMembers
        });
    }

    let mut history = state.history.clone();
    let mut last_painter = state.current_painter.as_ref();

    if members.iter().all(|member| history.contains(&member.token)) {
        info!(
            players = members.len(),
            "every active player painted; starting a new cycle"
        );
        history.clear();
        last_painter = None;
    }

    let len = members.len();
    let start = last_painter
        .and_then(|token| roster.position(token))
        .map_or(0, |index| (index + 1) % len);

    let scanned = (0..len)
        .map(|step| &members[(start + step) % len].token)
        .find(|token| !history.contains(*token))
        .cloned();

    let chosen = match scanned {
        Some(token) => token,
        None => {
            // Unreachable after the cycle reset above; recover instead of stalling the lobby.
            warn!(
                players = len,
                history = history.len(),
                "no unpainted player found after cycle check; falling back to the first player"
            );
            let first = members[0].token.clone();
            if history.contains(&first) {
                history.clear();
            }
            first
        }
    };

    history.insert(chosen.clone());
    let next = RotationState {
        current_painter: Some(chosen.clone()),
        history,
    };
    Ok((chosen, next))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::state::roster::RosterView;

    fn roster(tokens: &[&str]) -> RosterView {
        RosterView::from_resolutions(
            tokens
                .iter()
                .enumerate()
                .map(|(idx, token)| (idx as u64 + 1, Some(PlayerToken::from(*token)))),
        )
    }

    fn run(roster: &RosterView, mut state: RotationState, calls: usize) -> (Vec<String>, RotationState) {
        let mut chosen = Vec::with_capacity(calls);
        for _ in 0..calls {
            let (painter, next) = select_next(roster, &state).unwrap();
            chosen.push(painter.into_inner());
            state = next;
        }
        (chosen, state)
    }

    #[test]
    fn three_players_cycle_then_restart_at_first() {
        let roster = roster(&["a", "b", "c"]);
        let (chosen, state) = run(&roster, RotationState::default(), 4);

        assert_eq!(chosen, vec!["a", "b", "c", "a"]);
        assert_eq!(state.current_painter, Some(PlayerToken::from("a")));
        assert_eq!(state.history.len(), 1);
        assert!(state.history.contains(&PlayerToken::from("a")));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let state = RotationState {
            current_painter: Some("a".into()),
            history: [PlayerToken::from("a")].into_iter().collect(),
        };
        assert_eq!(
            select_next(&RosterView::default(), &state),
            Err(RotationError::EmptyRoster)
        );
    }

    #[test]
    fn unresolvable_members_are_reported_separately() {
        let roster = RosterView::from_resolutions([(1, None), (2, None)]);
        assert_eq!(roster.listed(), 2);
        assert_eq!(
            select_next(&roster, &RotationState::default()),
            Err(RotationError::NoResolvableMembers)
        );
    }

    #[test]
    fn resumes_after_last_painter_position() {
        let roster = roster(&["a", "b", "c", "d"]);
        let state = RotationState {
            current_painter: Some("c".into()),
            history: [PlayerToken::from("c")].into_iter().collect(),
        };

        let (painter, next) = select_next(&roster, &state).unwrap();
        assert_eq!(painter.as_str(), "d");
        assert_eq!(next.history.len(), 2);
    }

    #[test]
    fn missing_last_painter_starts_from_the_top() {
        let roster = roster(&["a", "b"]);
        let state = RotationState {
            current_painter: Some("gone".into()),
            history: [PlayerToken::from("gone")].into_iter().collect(),
        };

        let (painter, next) = select_next(&roster, &state).unwrap();
        assert_eq!(painter.as_str(), "a");
        assert!(next.history.contains(&PlayerToken::from("gone")));
    }

    #[test]
    fn joining_player_paints_within_the_running_cycle() {
        let (_, state) = run(&roster(&["a", "b"]), RotationState::default(), 2);
        let grown = roster(&["a", "b", "c"]);

        let (chosen, _) = run(&grown, state, 2);
        assert_eq!(chosen, vec!["c", "a"]);
    }

    #[test]
    fn reset_clears_everything() {
        let (_, mut state) = run(&roster(&["a", "b"]), RotationState::default(), 1);
        assert!(!state.is_empty());
        state.reset();
        assert_eq!(state, RotationState::default());
    }

    fn distinct_tokens() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z]{1,6}", 1..10)
            .prop_map(|set: BTreeSet<String>| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn every_player_paints_once_per_cycle(tokens in distinct_tokens()) {
            let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
            let roster = roster(&refs);
            let (chosen, _) = run(&roster, RotationState::default(), tokens.len());

            let unique: BTreeSet<&String> = chosen.iter().collect();
            prop_assert_eq!(unique.len(), tokens.len());
        }

        #[test]
        fn next_cycle_restarts_at_first_member(tokens in distinct_tokens()) {
            let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
            let roster = roster(&refs);
            let (_, state) = run(&roster, RotationState::default(), tokens.len());

            let (painter, next) = select_next(&roster, &state).unwrap();
            prop_assert_eq!(painter.as_str(), refs[0]);
            prop_assert_eq!(next.history.len(), 1);
        }

        #[test]
        fn arbitrary_state_always_yields_a_member(
            tokens in distinct_tokens(),
            stale in prop::collection::vec("[a-z]{1,6}", 0..12),
            last in proptest::option::of("[a-z]{1,6}"),
        ) {
            let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
            let roster = roster(&refs);
            let state = RotationState {
                current_painter: last.map(PlayerToken::from),
                history: stale.into_iter().map(PlayerToken::from).collect(),
            };

            let (painter, next) = select_next(&roster, &state).unwrap();
            prop_assert!(roster.position(&painter).is_some());
            prop_assert!(next.history.contains(&painter));
            prop_assert_eq!(next.current_painter, Some(painter));
        }
    }
}
