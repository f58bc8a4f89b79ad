//! Advance the painter of a lobby: load, resolve the roster, select, persist.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    dao::{models::UserId, storage::StorageError},
    error::ServiceError,
    services::lobby_service::load_lobby,
    state::{Lobby, RosterView, RotationError, SharedState, select_next},
};

/// Painter chosen by [`advance_turn`] together with the persisted lobby.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Lobby as stored after the turn advanced.
    pub lobby: Lobby,
    /// Player that paints next.
    pub painter_id: UserId,
    /// Roster the painter was selected from.
    pub roster: RosterView,
}

/// Select and persist the next painter of lobby `id`.
///
/// Runs under the lobby lock. A revision conflict from another writer reloads the lobby and
/// retries, up to the configured number of attempts. When no painter can be chosen the reset
/// rotation state is persisted before the rejection is returned.
pub async fn advance_turn(state: &SharedState, id: Uuid) -> Result<TurnOutcome, ServiceError> {
    let _guard = state.lock_lobby(id).await;

    let store = state.require_lobby_store().await?;
    let attempts = state.config().rotation.save_attempts;

    for attempt in 1..=attempts {
        let mut lobby = load_lobby(store.as_ref(), id).await?;
        let roster =
            RosterView::resolve(&lobby.player_ids, |player_id| store.find_user(player_id)).await?;

        let selection = match select_next(&roster, &lobby.rotation) {
            Ok((painter, rotation)) => {
                lobby.rotation = rotation;
                Ok(painter)
            }
            Err(err) => {
                log_rejection(id, &roster, err);
                if lobby.rotation.is_empty() {
                    return Err(err.into());
                }
                lobby.rotation.reset();
                Err(err)
            }
        };

        let stored = match store.save_lobby(lobby.into()).await {
            Ok(stored) => Lobby::from(stored),
            Err(StorageError::Conflict { .. }) => {
                warn!(lobby_id = %id, attempt, "lobby changed while advancing the turn; retrying");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let painter = selection?;
        let painter_id = roster.player_id(&painter).ok_or_else(|| {
            ServiceError::InvalidState(format!("painter of lobby `{id}` is not on the roster"))
        })?;

        info!(
            lobby_id = %id,
            painter_id,
            painted = stored.rotation.history.len(),
            players = roster.len(),
            "next painter selected"
        );
        return Ok(TurnOutcome {
            lobby: stored,
            painter_id,
            roster,
        });
    }

    warn!(lobby_id = %id, attempts, "giving up on advancing the turn after repeated conflicts");
    Err(ServiceError::Contention(id.to_string()))
}

fn log_rejection(id: Uuid, roster: &RosterView, err: RotationError) {
    match err {
        RotationError::EmptyRoster => {
            warn!(lobby_id = %id, "lobby has no players; resetting rotation")
        }
        RotationError::NoResolvableMembers => error!(
            lobby_id = %id,
            listed = roster.listed(),
            "no lobby player resolves to a user; resetting rotation"
        ),
    }
}
