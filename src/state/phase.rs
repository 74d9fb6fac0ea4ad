use super::{AppState, SecretCatalog};
use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;

impl CommunalAction {
    /// The only phase this action may be taken from
    pub fn legal_from(&self) -> Phase {
        match self {
            Self::Start => Phase::Lobby,
            Self::VotePhase => Phase::Clues,
            Self::ShowResults => Phase::Voting,
            Self::NextClue | Self::NextRound => Phase::Results,
        }
    }

    /// Whether eliminated participants are barred from this action
    pub fn requires_alive(&self) -> bool {
        matches!(self, Self::VotePhase | Self::NextClue | Self::ShowResults)
    }
}

impl Room {
    /// Check the phase guard for `action` without touching the room
    pub fn check_guard(&self, action: CommunalAction) -> GameResult<()> {
        let from = action.legal_from();
        if self.phase != from {
            return Err(GameError::PhaseViolation(format!(
                "Cannot {} during the {} phase (requires {})",
                action, self.phase, from
            )));
        }

        if matches!(action, CommunalAction::NextClue | CommunalAction::NextRound) {
            let awaiting = self.awaiting_action.map(CommunalAction::from);
            if awaiting != Some(action) {
                return Err(GameError::PhaseViolation(format!(
                    "Results are not waiting for {}",
                    action
                )));
            }
        }

        Ok(())
    }

    /// Communal actions currently legal in this room
    pub fn valid_actions(&self) -> Vec<CommunalAction> {
        CommunalAction::ALL
            .into_iter()
            .filter(|a| self.check_guard(*a).is_ok())
            .collect()
    }

    /// Apply the effect of `action`. This is the single transition function
    /// behind the quorum, the host override and the direct variants.
    ///
    /// Returns the round result when the action computed one.
    pub(crate) fn apply_action<R: Rng + ?Sized>(
        &mut self,
        action: CommunalAction,
        catalog: &SecretCatalog,
        rng: &mut R,
    ) -> GameResult<Option<RoundResult>> {
        self.check_guard(action)?;

        let result = match action {
            CommunalAction::Start | CommunalAction::NextRound => {
                self.start_new_game(catalog, rng);
                None
            }
            CommunalAction::VotePhase => {
                self.phase = Phase::Voting;
                None
            }
            CommunalAction::ShowResults => {
                let result = self.compute_results();
                self.phase = Phase::Results;
                Some(result)
            }
            CommunalAction::NextClue => {
                self.start_next_clue_round();
                None
            }
        };

        self.bump();
        tracing::info!(
            room_id = %self.id,
            action = %action,
            phase = %self.phase,
            "Transition applied"
        );
        Ok(result)
    }

    /// Retry the clue round with the same impostor and secret target
    pub fn start_next_clue_round(&mut self) {
        self.clear_round_scope();
        self.awaiting_action = None;
        self.clue_round += 1;
        self.phase = Phase::Clues;
    }

    /// Revive everyone, wipe round state and deal fresh roles
    pub fn start_new_game<R: Rng + ?Sized>(&mut self, catalog: &SecretCatalog, rng: &mut R) {
        for player in &mut self.players {
            player.alive = true;
            player.role = None;
            player.assigned_secret = None;
        }
        self.clear_round_scope();
        self.awaiting_action = None;
        self.game_over = false;
        self.impostor_won = false;
        self.last_result = None;
        self.round_no += 1;
        self.clue_round = 1;

        self.assign_roles_for_round(catalog, rng);
        self.phase = Phase::Clues;
    }

    /// Direct variant of a communal action that skips confirmations
    pub(crate) fn apply_direct<R: Rng + ?Sized>(
        &mut self,
        action: CommunalAction,
        catalog: &SecretCatalog,
        rng: &mut R,
    ) -> GameResult<Option<RoundResult>> {
        self.check_guard(action)?;
        self.confirmations.clear();
        self.apply_action(action, catalog, rng)
    }
}

impl AppState {
    /// Move from clues to voting without waiting for confirmations
    pub async fn request_vote_phase(&self, room_id: &str) -> GameResult<()> {
        self.with_room(room_id, |room| {
            let mut rng = rand::rng();
            room.apply_direct(CommunalAction::VotePhase, &self.catalog, &mut rng)
                .map(|_| ())
        })
        .await
    }

    /// Tally votes and reveal results without waiting for confirmations
    pub async fn compute_and_reveal_results(&self, room_id: &str) -> GameResult<RoundResult> {
        self.with_room(room_id, |room| {
            let mut rng = rand::rng();
            room.apply_direct(CommunalAction::ShowResults, &self.catalog, &mut rng)?
                .ok_or_else(|| {
                    GameError::PhaseViolation("Results were not computed".to_string())
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(n: usize) -> Room {
        let names: Vec<String> = (0..n).map(|i| format!("Player{}", i)).collect();
        Room::new("ROOM1".to_string(), &names, RoomConfig::default()).unwrap()
    }

    fn apply(room: &mut Room, action: CommunalAction) -> GameResult<Option<RoundResult>> {
        let mut rng = StdRng::seed_from_u64(3);
        room.apply_action(action, &SecretCatalog::builtin(), &mut rng)
    }

    #[test]
    fn test_legal_sources() {
        assert_eq!(CommunalAction::Start.legal_from(), Phase::Lobby);
        assert_eq!(CommunalAction::VotePhase.legal_from(), Phase::Clues);
        assert_eq!(CommunalAction::ShowResults.legal_from(), Phase::Voting);
        assert_eq!(CommunalAction::NextClue.legal_from(), Phase::Results);
        assert_eq!(CommunalAction::NextRound.legal_from(), Phase::Results);
    }

    #[test]
    fn test_lobby_only_allows_start() {
        let room = room(3);
        assert_eq!(room.valid_actions(), vec![CommunalAction::Start]);
    }

    #[test]
    fn test_forward_flow() {
        let mut room = room(3);

        apply(&mut room, CommunalAction::Start).unwrap();
        assert_eq!(room.phase, Phase::Clues);
        assert_eq!(room.round_no, 1);
        assert!(room.impostor().is_some());

        apply(&mut room, CommunalAction::VotePhase).unwrap();
        assert_eq!(room.phase, Phase::Voting);

        let result = apply(&mut room, CommunalAction::ShowResults).unwrap();
        assert!(result.is_some());
        assert_eq!(room.phase, Phase::Results);
        assert!(room.awaiting_action.is_some());
    }

    #[test]
    fn test_invalid_transitions_leave_room_untouched() {
        let mut room = room(3);
        let version = room.version;

        for action in [
            CommunalAction::VotePhase,
            CommunalAction::ShowResults,
            CommunalAction::NextClue,
            CommunalAction::NextRound,
        ] {
            let err = apply(&mut room, action).unwrap_err();
            assert!(matches!(err, GameError::PhaseViolation(_)));
        }

        assert_eq!(room.phase, Phase::Lobby);
        assert_eq!(room.version, version);
    }

    #[test]
    fn test_results_actions_require_matching_awaiting_action() {
        let mut room = room(5);
        apply(&mut room, CommunalAction::Start).unwrap();
        room.phase = Phase::Results;
        room.awaiting_action = Some(AwaitingAction::NextClue);

        let err = apply(&mut room, CommunalAction::NextRound).unwrap_err();
        assert!(err.to_string().contains("not waiting for nextRound"));
        assert_eq!(room.valid_actions(), vec![CommunalAction::NextClue]);

        apply(&mut room, CommunalAction::NextClue).unwrap();
        assert_eq!(room.phase, Phase::Clues);
        assert_eq!(room.awaiting_action, None);
    }

    #[test]
    fn test_next_clue_round_keeps_roles() {
        let mut room = room(5);
        apply(&mut room, CommunalAction::Start).unwrap();
        let impostor = room.impostor().unwrap().id.clone();
        let target = room.secret_target.clone();
        room.clues.push(Clue {
            author_id: impostor.clone(),
            text: "hmm".to_string(),
            ts: chrono::Utc::now().to_rfc3339(),
        });

        room.start_next_clue_round();

        assert!(room.clues.is_empty());
        assert_eq!(room.impostor().unwrap().id, impostor);
        assert_eq!(room.secret_target, target);
        assert_eq!(room.clue_round, 2);
    }

    #[test]
    fn test_new_game_revives_everyone() {
        let mut room = room(4);
        apply(&mut room, CommunalAction::Start).unwrap();
        room.players[0].alive = false;
        room.players[1].alive = false;
        room.game_over = true;
        room.impostor_won = true;

        let mut rng = StdRng::seed_from_u64(9);
        room.start_new_game(&SecretCatalog::builtin(), &mut rng);

        assert!(room.players.iter().all(|p| p.alive));
        assert_eq!(
            room.players
                .iter()
                .filter(|p| p.role == Some(Role::Impostor))
                .count(),
            1
        );
        assert!(!room.game_over);
        assert!(!room.impostor_won);
        assert_eq!(room.round_no, 2);
        assert_eq!(room.phase, Phase::Clues);
    }

    #[test]
    fn test_direct_variant_clears_confirmations() {
        let mut room = room(3);
        apply(&mut room, CommunalAction::Start).unwrap();
        let voter = room.players[0].id.clone();
        room.confirmations
            .entry(CommunalAction::VotePhase)
            .or_default()
            .insert(voter);

        let mut rng = StdRng::seed_from_u64(5);
        room.apply_direct(CommunalAction::VotePhase, &SecretCatalog::builtin(), &mut rng)
            .unwrap();

        assert_eq!(room.phase, Phase::Voting);
        assert!(room.confirmations.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_operations_share_transition() {
        let state = AppState::new();
        let roster = state
            .create_room(&["Alice".to_string(), "Bob".to_string(), "Cara".to_string()])
            .await
            .unwrap();

        assert!(matches!(
            state.request_vote_phase(&roster.room_id).await,
            Err(GameError::PhaseViolation(_))
        ));

        state
            .force(&roster.room_id, &roster.host_id, CommunalAction::Start)
            .await
            .unwrap();
        state.request_vote_phase(&roster.room_id).await.unwrap();
        let result = state
            .compute_and_reveal_results(&roster.room_id)
            .await
            .unwrap();

        // Nobody voted, nobody is out
        assert!(!result.success);
        assert!(result.eliminated.is_none());
        assert!(result.players.iter().all(|p| p.alive));
    }
}
