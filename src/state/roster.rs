use std::{collections::HashSet, future::Future};

use futures::future::try_join_all;
use tracing::warn;

use super::rotation::PlayerToken;
use crate::dao::{
    models::{UserEntity, UserId},
    storage::StorageResult,
};

/// Lobby member that resolved to a live user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    /// Id as listed in the lobby.
    pub player_id: UserId,
    /// Token the rotation tracks the member by.
    pub token: PlayerToken,
}

/// Ordered view of the lobby members that currently take part in the rotation.
///
/// Built fresh for every rotation request. Unresolved ids stay lobby members but are left
/// out of the view; `listed` remembers how many ids the lobby had so callers can tell an
/// empty lobby from one whose members all vanished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterView {
    listed: usize,
    members: Vec<RosterMember>,
}

impl RosterView {
    /// Build a view from `(player id, resolved token)` pairs in membership order.
    pub fn from_resolutions<I>(resolutions: I) -> Self
    where
        I: IntoIterator<Item = (UserId, Option<PlayerToken>)>,
    {
        let mut listed = 0;
        let mut seen = HashSet::new();
        let mut members = Vec::new();

        for (player_id, token) in resolutions {
            listed += 1;
            let Some(token) = token else {
                warn!(player_id, "lobby member does not resolve to a user; skipping");
                continue;
            };
            if !seen.insert(token.clone()) {
                warn!(player_id, "lobby member shares a token with an earlier member; skipping");
                continue;
            }
            members.push(RosterMember { player_id, token });
        }

        Self { listed, members }
    }

    /// Resolve every id through `lookup`, preserving membership order.
    ///
    /// Missing users are dropped; storage failures abort the whole resolution.
    pub async fn resolve<F, Fut>(player_ids: &[UserId], lookup: F) -> StorageResult<Self>
    where
        F: Fn(UserId) -> Fut,
        Fut: Future<Output = StorageResult<Option<UserEntity>>>,
    {
        let users = try_join_all(player_ids.iter().map(|id| lookup(*id))).await?;
        Ok(Self::from_resolutions(
            player_ids
                .iter()
                .copied()
                .zip(users.into_iter().map(|user| user.map(|u| PlayerToken::from(u.token)))),
        ))
    }

    /// Number of ids the lobby listed, resolvable or not.
    pub fn listed(&self) -> usize {
        self.listed
    }

    /// Resolved members in membership order.
    pub fn members(&self) -> &[RosterMember] {
        &self.members
    }

    /// Number of resolved members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no member resolved.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Index of `token` in the view.
    pub fn position(&self, token: &PlayerToken) -> Option<usize> {
        self.members.iter().position(|member| &member.token == token)
    }

    /// Player id behind `token`.
    pub fn player_id(&self, token: &PlayerToken) -> Option<UserId> {
        self.members
            .iter()
            .find(|member| &member.token == token)
            .map(|member| member.player_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::dao::storage::StorageError;

    fn user(id: UserId, token: &str) -> UserEntity {
        UserEntity {
            id,
            username: format!("user-{id}"),
            token: token.into(),
        }
    }

    #[tokio::test]
    async fn unresolved_ids_are_dropped_in_order() {
        let users: HashMap<UserId, UserEntity> =
            [(1, user(1, "t1")), (3, user(3, "t3"))].into_iter().collect();

        let view = RosterView::resolve(&[3, 2, 1], |id| {
            let found = users.get(&id).cloned();
            async move { Ok(found) }
        })
        .await
        .unwrap();

        assert_eq!(view.listed(), 3);
        let tokens: Vec<&str> = view.members().iter().map(|m| m.token.as_str()).collect();
        assert_eq!(tokens, vec!["t3", "t1"]);
        assert_eq!(view.player_id(&PlayerToken::from("t1")), Some(1));
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let result = RosterView::resolve(&[1], |_| async {
            Err(StorageError::unavailable(
                "lookup failed".into(),
                std::io::Error::other("down"),
            ))
        })
        .await;

        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
    }

    #[test]
    fn duplicate_tokens_keep_first_member() {
        let view = RosterView::from_resolutions([
            (1, Some(PlayerToken::from("same"))),
            (2, Some(PlayerToken::from("same"))),
        ]);

        assert_eq!(view.listed(), 2);
        assert_eq!(view.len(), 1);
        assert_eq!(view.members()[0].player_id, 1);
    }
}
