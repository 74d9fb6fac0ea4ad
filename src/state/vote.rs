use crate::error::{GameError, GameResult};
use crate::state::AppState;
use crate::types::*;
use std::collections::HashMap;

impl Room {
    /// Cast a vote. Each living participant votes once per voting phase.
    pub fn submit_vote(&mut self, voter_id: &str, target_id: &str) -> GameResult<Vote> {
        if self.phase != Phase::Voting {
            return Err(GameError::PhaseViolation(format!(
                "Votes can only be cast during the voting phase, not {}",
                self.phase
            )));
        }
        self.require_player(voter_id)?;
        self.require_player(target_id)?;
        self.require_alive(voter_id)?;
        self.require_alive(target_id)?;
        if self.votes.iter().any(|v| v.voter_id == voter_id) {
            return Err(GameError::DuplicateVote(voter_id.to_string()));
        }

        let vote = Vote {
            voter_id: voter_id.to_string(),
            target_id: target_id.to_string(),
        };
        self.votes.push(vote.clone());
        self.bump();
        Ok(vote)
    }

    /// Vote counts per target, in join order
    pub fn tally(&self) -> Vec<TallyEntry> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for vote in &self.votes {
            *counts.entry(vote.target_id.as_str()).or_insert(0) += 1;
        }

        self.players
            .iter()
            .filter_map(|p| {
                counts.get(p.id.as_str()).map(|&votes| TallyEntry {
                    target_id: p.id.clone(),
                    votes,
                })
            })
            .collect()
    }

    /// The most-voted participant. Ties go to whoever joined first.
    pub fn accused(&self) -> Option<PlayerId> {
        let tally = self.tally();
        let top = tally.iter().map(|t| t.votes).max()?;
        tally
            .into_iter()
            .find(|t| t.votes == top)
            .map(|t| t.target_id)
    }

    /// Tally the votes, apply any elimination and decide how the game goes on
    pub fn compute_results(&mut self) -> RoundResult {
        let tally = self.tally();
        let accused = self.accused();
        let impostor_id = self.impostor().map(|p| p.id.clone());

        let (success, eliminated, message) = match accused {
            Some(ref id) if Some(id) == impostor_id.as_ref() => {
                (true, None, "The impostor was caught!".to_string())
            }
            Some(id) => {
                let name = match self.player_mut(&id) {
                    Some(player) => {
                        player.alive = false;
                        player.name.clone()
                    }
                    None => id.clone(),
                };
                (
                    false,
                    Some(id),
                    format!("{} was voted out, but was not the impostor.", name),
                )
            }
            None => (
                false,
                None,
                "No votes were cast. Nobody was voted out.".to_string(),
            ),
        };

        let mut message = message;
        if success {
            self.game_over = true;
            self.impostor_won = false;
            self.awaiting_action = Some(AwaitingAction::NextRound);
        } else if self.alive_count() <= 2 {
            self.game_over = true;
            self.impostor_won = true;
            self.awaiting_action = Some(AwaitingAction::NextRound);
            message.push_str(" The impostor wins!");
        } else {
            self.game_over = false;
            self.impostor_won = false;
            self.awaiting_action = Some(AwaitingAction::NextClue);
        }

        let result = RoundResult {
            message,
            success,
            game_over: self.game_over,
            impostor_won: self.impostor_won,
            eliminated,
            votes: self.votes.clone(),
            tally,
            players: self.players.iter().map(RosterEntry::from).collect(),
        };

        tracing::info!(
            room_id = %self.id,
            success,
            game_over = self.game_over,
            impostor_won = self.impostor_won,
            alive = self.alive_count(),
            "Results computed"
        );
        self.last_result = Some(result.clone());
        result
    }
}

impl AppState {
    pub async fn submit_vote(
        &self,
        room_id: &str,
        voter_id: &str,
        target_id: &str,
    ) -> GameResult<Vote> {
        self.with_room(room_id, |room| {
            let vote = room.submit_vote(voter_id, target_id)?;
            tracing::info!(
                room_id = %room.id,
                voter_id = %voter_id,
                votes = room.votes.len(),
                "Vote cast"
            );
            Ok(vote)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Room in the voting phase with player 0 as impostor
    fn voting_room(n: usize) -> Room {
        let names: Vec<String> = (0..n).map(|i| format!("Player{}", i)).collect();
        let mut room = Room::new("ROOM1".to_string(), &names, RoomConfig::default()).unwrap();
        for (i, player) in room.players.iter_mut().enumerate() {
            if i == 0 {
                player.role = Some(Role::Impostor);
            } else {
                player.role = Some(Role::Crew);
                player.assigned_secret = Some("beach".to_string());
            }
        }
        room.phase = Phase::Voting;
        room
    }

    fn vote(room: &mut Room, voter: usize, target: usize) -> GameResult<Vote> {
        let voter = room.players[voter].id.clone();
        let target = room.players[target].id.clone();
        room.submit_vote(&voter, &target)
    }

    #[test]
    fn test_submit_vote_once_per_voter() {
        let mut room = voting_room(3);

        vote(&mut room, 1, 0).unwrap();
        assert!(matches!(
            vote(&mut room, 1, 2),
            Err(GameError::DuplicateVote(_))
        ));
        assert_eq!(room.votes.len(), 1);
    }

    #[test]
    fn test_submit_vote_guards() {
        let mut room = voting_room(4);
        room.players[3].alive = false;

        assert!(matches!(
            vote(&mut room, 3, 0),
            Err(GameError::EliminatedPlayer(_))
        ));
        assert!(matches!(
            vote(&mut room, 0, 3),
            Err(GameError::EliminatedPlayer(_))
        ));
        let voter = room.players[1].id.clone();
        assert!(matches!(
            room.submit_vote(&voter, "ghost"),
            Err(GameError::PlayerNotFound(_))
        ));
        let eliminated = room.players[3].id.clone();
        assert!(matches!(
            room.submit_vote(&eliminated, "ghost"),
            Err(GameError::PlayerNotFound(_))
        ));

        room.phase = Phase::Clues;
        assert!(matches!(
            vote(&mut room, 1, 0),
            Err(GameError::PhaseViolation(_))
        ));
        assert!(room.votes.is_empty());
    }

    #[test]
    fn test_tally_empty() {
        let room = voting_room(3);

        assert!(room.tally().is_empty());
        assert!(room.accused().is_none());
    }

    #[test]
    fn test_tie_goes_to_earliest_joiner() {
        let mut room = voting_room(4);
        // Player2 and Player1 tied at two votes each
        vote(&mut room, 0, 2).unwrap();
        vote(&mut room, 3, 2).unwrap();
        vote(&mut room, 2, 1).unwrap();
        vote(&mut room, 1, 1).unwrap();

        assert_eq!(room.accused(), Some(room.players[1].id.clone()));
    }

    #[test]
    fn test_catching_the_impostor() {
        let mut room = voting_room(3);
        vote(&mut room, 0, 1).unwrap();
        vote(&mut room, 1, 0).unwrap();
        vote(&mut room, 2, 0).unwrap();

        let result = room.compute_results();

        assert!(result.success);
        assert!(result.game_over);
        assert!(!result.impostor_won);
        assert!(result.eliminated.is_none());
        assert_eq!(room.awaiting_action, Some(AwaitingAction::NextRound));
        assert!(room.players.iter().all(|p| p.alive));
        assert!(!result.message.contains("Player0"));
    }

    #[test]
    fn test_wrong_accusation_with_few_left_hands_impostor_the_win() {
        let mut room = voting_room(3);
        vote(&mut room, 0, 1).unwrap();
        vote(&mut room, 2, 1).unwrap();
        vote(&mut room, 1, 2).unwrap();

        let result = room.compute_results();

        assert!(!result.success);
        assert!(result.game_over);
        assert!(result.impostor_won);
        assert_eq!(result.eliminated, Some(room.players[1].id.clone()));
        assert!(!room.players[1].alive);
        assert_eq!(room.awaiting_action, Some(AwaitingAction::NextRound));
    }

    #[test]
    fn test_wrong_accusation_game_goes_on() {
        let mut room = voting_room(5);
        vote(&mut room, 0, 4).unwrap();
        vote(&mut room, 1, 4).unwrap();

        let result = room.compute_results();

        assert!(!result.success);
        assert!(!result.game_over);
        assert_eq!(room.alive_count(), 4);
        assert_eq!(room.awaiting_action, Some(AwaitingAction::NextClue));
        assert_eq!(result.tally.len(), 1);
        assert_eq!(result.tally[0].votes, 2);
    }

    #[test]
    fn test_no_votes_eliminates_nobody() {
        let mut room = voting_room(4);

        let result = room.compute_results();

        assert!(!result.success);
        assert!(result.eliminated.is_none());
        assert_eq!(room.alive_count(), 4);
        assert_eq!(room.awaiting_action, Some(AwaitingAction::NextClue));
    }
}
