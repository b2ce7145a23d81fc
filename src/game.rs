//! Round bookkeeping, scoreboard and button gating

use crate::constants::TOTAL_ROUNDS;
use crate::types::{Outcome, RoundResult, Scoreboard, SessionPhase};

impl Scoreboard {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Player => self.player += 1,
            Outcome::Bot => self.bot += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Retry | Outcome::Unknown => {}
        }
    }

    pub fn tally<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut acc, outcome| {
            acc.record(outcome);
            acc
        })
    }
}

/// One slot per round; slot `n - 1` holds round `n`
#[derive(Debug, Clone, Default)]
pub struct RoundSlots {
    slots: [Option<RoundResult>; TOTAL_ROUNDS],
}

impl RoundSlots {
    /// Store a played round. Retries and out-of-range round numbers are not recorded.
    pub fn record(&mut self, result: RoundResult) -> bool {
        if result.outcome == Outcome::Retry {
            return false;
        }
        match result
            .round_number
            .checked_sub(1)
            .and_then(|idx| self.slots.get_mut(idx))
        {
            Some(slot) => {
                *slot = Some(result);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, idx: usize) -> Option<&RoundResult> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    #[cfg(test)]
    pub fn played(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::tally(self.slots.iter().flatten().map(|r| &r.outcome))
    }
}

pub fn can_play_round(phase: &SessionPhase, is_working: bool) -> bool {
    *phase == SessionPhase::Active && !is_working
}

pub fn can_capture_expression(phase: &SessionPhase, is_working: bool) -> bool {
    *phase == SessionPhase::NeedsExpression && !is_working
}

/// Status line shown after a recorded round
pub fn round_message(result: &RoundResult) -> String {
    if result.status == SessionPhase::NeedsExpression {
        format!(
            "Bot chose {}. All rounds done! Time to capture your victory pose.",
            result.bot_move
        )
    } else {
        format!(
            "Bot played {}. Round {} captured. Ready for the next one.",
            result.bot_move, result.round_number
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;

    pub(crate) fn round(n: usize, outcome: Outcome, status: SessionPhase) -> RoundResult {
        RoundResult {
            session_id: "s1".into(),
            round_number: n,
            player_move: "rock".into(),
            bot_move: "scissors".into(),
            outcome,
            stats: BTreeMap::from([("rock".to_string(), 12)]),
            remaining_rounds: TOTAL_ROUNDS.saturating_sub(n),
            status,
            message: None,
            captured_at: None,
        }
    }

    #[test]
    fn tally_counts_each_outcome() {
        let outcomes = [
            Outcome::Player,
            Outcome::Bot,
            Outcome::Draw,
            Outcome::Player,
            Outcome::Retry,
            Outcome::Unknown,
        ];
        let board = Scoreboard::tally(&outcomes);
        assert_eq!(board, Scoreboard { player: 2, bot: 1, draws: 1 });
    }

    #[test]
    fn slots_place_rounds_by_number() {
        let mut slots = RoundSlots::default();
        assert!(slots.record(round(2, Outcome::Bot, SessionPhase::Active)));
        assert!(slots.get(0).is_none());
        assert_eq!(slots.get(1).map(|r| r.round_number), Some(2));
        assert_eq!(slots.played(), 1);
    }

    #[test]
    fn slots_skip_retry_and_out_of_range() {
        let mut slots = RoundSlots::default();
        assert!(!slots.record(round(1, Outcome::Retry, SessionPhase::Active)));
        assert!(!slots.record(round(0, Outcome::Player, SessionPhase::Active)));
        assert!(!slots.record(round(TOTAL_ROUNDS + 1, Outcome::Player, SessionPhase::Active)));
        assert_eq!(slots.played(), 0);
    }

    #[test]
    fn rerecording_a_round_replaces_it() {
        let mut slots = RoundSlots::default();
        slots.record(round(1, Outcome::Bot, SessionPhase::Active));
        slots.record(round(1, Outcome::Player, SessionPhase::Active));
        assert_eq!(slots.scoreboard(), Scoreboard { player: 1, bot: 0, draws: 0 });
    }

    #[test]
    fn clear_resets_scoreboard() {
        let mut slots = RoundSlots::default();
        slots.record(round(1, Outcome::Draw, SessionPhase::Active));
        slots.clear();
        assert_eq!(slots.scoreboard(), Scoreboard::default());
        assert_eq!(slots.played(), 0);
    }

    #[test]
    fn gating_follows_phase_and_work() {
        assert!(can_play_round(&SessionPhase::Active, false));
        assert!(!can_play_round(&SessionPhase::Active, true));
        assert!(!can_play_round(&SessionPhase::NeedsExpression, false));
        assert!(can_capture_expression(&SessionPhase::NeedsExpression, false));
        assert!(!can_capture_expression(&SessionPhase::NeedsExpression, true));
        assert!(!can_capture_expression(&SessionPhase::Completed, false));
    }

    #[test]
    fn round_message_depends_on_phase() {
        let mid = round(1, Outcome::Player, SessionPhase::Active);
        assert_eq!(
            round_message(&mid),
            "Bot played scissors. Round 1 captured. Ready for the next one."
        );
        let last = round(3, Outcome::Player, SessionPhase::NeedsExpression);
        assert_eq!(
            round_message(&last),
            "Bot chose scissors. All rounds done! Time to capture your victory pose."
        );
    }
}
