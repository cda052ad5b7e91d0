use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::models::errors::GameError;
use crate::models::game::{Role, Winner};

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 20;

/// Move text meaning "forfeit this round".
pub const FOLD_SENTINEL: &str = "x";

/// A submitted move: a guess in [MIN_NUMBER, MAX_NUMBER] or a fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveValue {
    Guess(u8),
    Fold,
}

impl MoveValue {
    pub fn guess(number: u8) -> Result<Self, GameError> {
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
            return Err(GameError::InvalidMove(format!(
                "{} is outside {}..={}",
                number, MIN_NUMBER, MAX_NUMBER
            )));
        }
        Ok(MoveValue::Guess(number))
    }

    pub fn is_fold(&self) -> bool {
        matches!(self, MoveValue::Fold)
    }
}

impl FromStr for MoveValue {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == FOLD_SENTINEL {
            return Ok(MoveValue::Fold);
        }

        let number: u8 = trimmed.parse().map_err(|_| {
            GameError::InvalidMove(format!("'{}' is neither a number nor a fold", trimmed))
        })?;
        MoveValue::guess(number)
    }
}

impl std::fmt::Display for MoveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveValue::Guess(number) => write!(f, "{}", number),
            MoveValue::Fold => write!(f, "{}", FOLD_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMove {
    pub user_id: String,
    pub value: MoveValue,
    pub submitted_at: DateTime<Utc>,
}

impl PlayerMove {
    pub fn new(user_id: &str, value: MoveValue) -> Self {
        PlayerMove {
            user_id: user_id.to_string(),
            value,
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundWinner {
    Unresolved,
    Decided(Winner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Pending,
    AwaitingSecondMove,
    Resolved,
}

/// Source of the hidden target number.
#[cfg_attr(test, automock)]
pub trait TargetGenerator: Send + Sync {
    /// Returns a number in `min..=max`.
    fn generate(&self, min: u8, max: u8) -> u8;
}

/// Uniform draw from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTarget;

impl TargetGenerator for RandomTarget {
    fn generate(&self, min: u8, max: u8) -> u8 {
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Scores two guesses against the target: the strictly closer guess wins,
/// equal distances (including two exact hits) are a draw.
pub fn closest_guess(guess_number: u8, player_1: u8, player_2: u8) -> Winner {
    let diff_1 = guess_number.abs_diff(player_1);
    let diff_2 = guess_number.abs_diff(player_2);

    match diff_1.cmp(&diff_2) {
        Ordering::Less => Winner::PlayerOne,
        Ordering::Greater => Winner::PlayerTwo,
        Ordering::Equal => Winner::None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub game_id: String,
    pub round_id: u8,
    pub player_1_move: Option<PlayerMove>,
    pub player_2_move: Option<PlayerMove>,
    pub guess_number: Option<u8>,
    pub winner: RoundWinner,
    /// Bumped on every stored update; guards concurrent writers.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Round {
    pub fn new(game_id: &str, round_id: u8) -> Self {
        Round {
            game_id: game_id.to_string(),
            round_id,
            player_1_move: None,
            player_2_move: None,
            guess_number: None,
            winner: RoundWinner::Unresolved,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn state(&self) -> RoundState {
        if self.is_resolved() {
            return RoundState::Resolved;
        }
        match (&self.player_1_move, &self.player_2_move) {
            (None, None) => RoundState::Pending,
            _ => RoundState::AwaitingSecondMove,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.winner, RoundWinner::Decided(_))
    }

    /// The decided winner, or `None` while the round is unresolved.
    pub fn winner(&self) -> Option<Winner> {
        match self.winner {
            RoundWinner::Decided(winner) => Some(winner),
            RoundWinner::Unresolved => None,
        }
    }

    pub fn move_of(&self, role: Role) -> Option<&PlayerMove> {
        match role {
            Role::PlayerOne => self.player_1_move.as_ref(),
            Role::PlayerTwo => self.player_2_move.as_ref(),
        }
    }

    /// Stores the move in the submitter's slot and resolves the round once
    /// it can be decided. A fold hands the round to the opponent without
    /// drawing a target.
    pub fn record_move(
        &mut self,
        role: Role,
        player_move: PlayerMove,
        targets: &dyn TargetGenerator,
    ) -> Result<(), GameError> {
        if self.is_resolved() {
            return Err(GameError::InvalidMove(format!(
                "round {} is already resolved",
                self.round_id
            )));
        }

        let slot = match role {
            Role::PlayerOne => &mut self.player_1_move,
            Role::PlayerTwo => &mut self.player_2_move,
        };
        if slot.is_some() {
            return Err(GameError::MoveAlreadySubmitted(role));
        }

        let folded = player_move.value.is_fold();
        *slot = Some(player_move);

        if folded {
            self.winner = RoundWinner::Decided(role.opponent().into());
            return Ok(());
        }

        self.resolve(targets);
        Ok(())
    }

    fn resolve(&mut self, targets: &dyn TargetGenerator) {
        let values = (
            self.player_1_move.as_ref().map(|m| m.value),
            self.player_2_move.as_ref().map(|m| m.value),
        );

        if let (Some(MoveValue::Guess(player_1)), Some(MoveValue::Guess(player_2))) = values {
            let guess_number = targets.generate(MIN_NUMBER, MAX_NUMBER);
            self.guess_number = Some(guess_number);
            self.winner = RoundWinner::Decided(closest_guess(guess_number, player_1, player_2));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    struct FixedTarget(u8);

    impl TargetGenerator for FixedTarget {
        fn generate(&self, _min: u8, _max: u8) -> u8 {
            self.0
        }
    }

    fn guess(user_id: &str, number: u8) -> PlayerMove {
        PlayerMove::new(user_id, MoveValue::Guess(number))
    }

    fn fold(user_id: &str) -> PlayerMove {
        PlayerMove::new(user_id, MoveValue::Fold)
    }

    #[test_case(10, 8, 15 => Winner::PlayerOne ; "player one closer")]
    #[test_case(10, 5, 15 => Winner::None ; "equal distance on both sides")]
    #[test_case(10, 10, 10 => Winner::None ; "both exact hits")]
    #[test_case(1, 20, 2 => Winner::PlayerTwo ; "player two closer at the low edge")]
    #[test_case(20, 20, 1 => Winner::PlayerOne ; "exact hit beats far miss")]
    fn test_closest_guess(guess_number: u8, player_1: u8, player_2: u8) -> Winner {
        closest_guess(guess_number, player_1, player_2)
    }

    #[test_case("7" => Ok(MoveValue::Guess(7)) ; "plain number")]
    #[test_case(" 20 " => Ok(MoveValue::Guess(20)) ; "whitespace is trimmed")]
    #[test_case("x" => Ok(MoveValue::Fold) ; "fold sentinel")]
    #[test_case("1" => Ok(MoveValue::Guess(1)) ; "lower bound")]
    fn test_parse_valid_moves(input: &str) -> Result<MoveValue, GameError> {
        input.parse()
    }

    #[test_case("0" ; "below range")]
    #[test_case("21" ; "above range")]
    #[test_case("-3" ; "negative")]
    #[test_case("seven" ; "not a number")]
    #[test_case("X" ; "fold sentinel is case sensitive")]
    #[test_case("" ; "empty")]
    fn test_parse_invalid_moves(input: &str) {
        let result = input.parse::<MoveValue>();
        assert!(matches!(result, Err(GameError::InvalidMove(_))));
    }

    #[test]
    fn test_new_round_is_pending() {
        let round = Round::new("game-1", 1);

        assert_eq!(round.state(), RoundState::Pending);
        assert_eq!(round.winner, RoundWinner::Unresolved);
        assert!(round.winner().is_none());
        assert!(round.guess_number.is_none());
    }

    #[test]
    fn test_first_guess_waits_for_second_move() {
        let mut round = Round::new("game-1", 1);
        let mut targets = MockTargetGenerator::new();
        targets.expect_generate().times(0);

        round
            .record_move(Role::PlayerTwo, guess("p2", 4), &targets)
            .unwrap();

        assert_eq!(round.state(), RoundState::AwaitingSecondMove);
        assert!(round.player_1_move.is_none());
        assert_eq!(round.move_of(Role::PlayerTwo).unwrap().user_id, "p2");
    }

    #[test]
    fn test_second_guess_draws_target_once_and_resolves() {
        let mut round = Round::new("game-1", 1);
        let mut targets = MockTargetGenerator::new();
        targets
            .expect_generate()
            .withf(|min, max| *min == MIN_NUMBER && *max == MAX_NUMBER)
            .times(1)
            .return_const(10u8);

        round
            .record_move(Role::PlayerOne, guess("p1", 8), &targets)
            .unwrap();
        round
            .record_move(Role::PlayerTwo, guess("p2", 15), &targets)
            .unwrap();

        assert_eq!(round.state(), RoundState::Resolved);
        assert_eq!(round.guess_number, Some(10));
        assert_eq!(round.winner(), Some(Winner::PlayerOne));
    }

    #[test]
    fn test_fold_as_second_move_loses_without_target() {
        let mut round = Round::new("game-1", 1);
        let mut targets = MockTargetGenerator::new();
        targets.expect_generate().times(0);

        round
            .record_move(Role::PlayerOne, guess("p1", 3), &targets)
            .unwrap();
        round
            .record_move(Role::PlayerTwo, fold("p2"), &targets)
            .unwrap();

        assert_eq!(round.winner(), Some(Winner::PlayerOne));
        assert!(round.guess_number.is_none());
        assert_eq!(round.state(), RoundState::Resolved);
    }

    #[test]
    fn test_fold_as_first_move_resolves_round_immediately() {
        let mut round = Round::new("game-1", 1);
        let mut targets = MockTargetGenerator::new();
        targets.expect_generate().times(0);

        round
            .record_move(Role::PlayerOne, fold("p1"), &targets)
            .unwrap();

        assert_eq!(round.winner(), Some(Winner::PlayerTwo));
        assert!(round.player_2_move.is_none());
        assert!(round.guess_number.is_none());
    }

    #[test]
    fn test_same_role_cannot_move_twice() {
        let mut round = Round::new("game-1", 1);
        let targets = FixedTarget(10);

        round
            .record_move(Role::PlayerOne, guess("p1", 3), &targets)
            .unwrap();
        let result = round.record_move(Role::PlayerOne, guess("p1", 4), &targets);

        assert_eq!(result, Err(GameError::MoveAlreadySubmitted(Role::PlayerOne)));
        assert_eq!(round.move_of(Role::PlayerOne).unwrap().value, MoveValue::Guess(3));
    }

    #[test]
    fn test_resolved_round_never_changes() {
        let mut round = Round::new("game-1", 1);
        let targets = FixedTarget(10);

        round
            .record_move(Role::PlayerTwo, fold("p2"), &targets)
            .unwrap();
        let before = round.clone();
        let result = round.record_move(Role::PlayerOne, guess("p1", 10), &targets);

        assert!(matches!(result, Err(GameError::InvalidMove(_))));
        assert_eq!(round, before);
    }

    #[test]
    fn test_random_target_stays_in_range() {
        let targets = RandomTarget;
        for _ in 0..500 {
            let n = targets.generate(MIN_NUMBER, MAX_NUMBER);
            assert!((MIN_NUMBER..=MAX_NUMBER).contains(&n));
        }
    }

    #[test]
    fn test_round_serialization() {
        let mut round = Round::new("game-1", 2);
        round
            .record_move(Role::PlayerOne, guess("p1", 8), &FixedTarget(10))
            .unwrap();

        let serialized = serde_json::to_string(&round).unwrap();
        assert!(serialized.contains("\"round_id\":2"));
        assert!(serialized.contains("\"unresolved\""));
        assert!(serialized.contains("\"guess\":8"));

        let deserialized: Round = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, round);
    }

    proptest! {
        #[test]
        fn prop_equal_diffs_are_a_draw(target in 1u8..=20, offset in 0u8..=10) {
            let low = target.saturating_sub(offset);
            let high = target.saturating_add(offset);
            prop_assume!(target.abs_diff(low) == target.abs_diff(high));
            prop_assert_eq!(closest_guess(target, low, high), Winner::None);
            prop_assert_eq!(closest_guess(target, high, low), Winner::None);
        }

        #[test]
        fn prop_smaller_diff_always_wins(target in 1u8..=20, a in 1u8..=20, b in 1u8..=20) {
            let winner = closest_guess(target, a, b);
            let (diff_a, diff_b) = (target.abs_diff(a), target.abs_diff(b));
            if diff_a < diff_b {
                prop_assert_eq!(winner, Winner::PlayerOne);
            } else if diff_b < diff_a {
                prop_assert_eq!(winner, Winner::PlayerTwo);
            } else {
                prop_assert_eq!(winner, Winner::None);
            }
        }

        #[test]
        fn prop_fold_loses_to_any_guess(number in 1u8..=20, target in 1u8..=20, folder_is_one in any::<bool>()) {
            let mut round = Round::new("game-1", 1);
            let (folder, guesser) = if folder_is_one {
                (Role::PlayerOne, Role::PlayerTwo)
            } else {
                (Role::PlayerTwo, Role::PlayerOne)
            };
            let targets = FixedTarget(target);

            round.record_move(guesser, guess("guesser", number), &targets).unwrap();
            round.record_move(folder, fold("folder"), &targets).unwrap();

            prop_assert_eq!(round.winner(), Some(Winner::from(guesser)));
            prop_assert!(round.guess_number.is_none());
        }
    }
}
