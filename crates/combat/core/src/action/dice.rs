//! Dice-pool arithmetic.

use crate::env::DiceRoller;

/// Outcome of a contested pool roll.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolRoll {
    pub faces: Vec<u32>,
    pub difficulty: u32,
    /// Faces at or above the difficulty minus the ones rolled. May be negative.
    pub successes: i32,
    pub ones: u32,
}

impl PoolRoll {
    pub fn evaluate(faces: Vec<u32>, difficulty: u32) -> Self {
        let hits = faces.iter().filter(|&&f| f >= difficulty).count() as i32;
        let ones = faces.iter().filter(|&&f| f == 1).count() as u32;
        Self {
            faces,
            difficulty,
            successes: hits - ones as i32,
            ones,
        }
    }

    pub fn dice(&self) -> u32 {
        self.faces.len() as u32
    }

    /// Negative successes with at least one 1.
    pub fn is_botch(&self) -> bool {
        self.successes < 0 && self.ones > 0
    }
}

/// `attribute + ability - penalty`, floored at one die.
pub fn dice_pool(attribute: i32, ability: i32, penalty: u32) -> u32 {
    let raw = attribute + ability - penalty as i32;
    if raw <= 0 { 1 } else { raw as u32 }
}

/// Rolls a contested pool: ones cancel successes.
pub fn roll_pool(dice: &mut dyn DiceRoller, pool: u32, difficulty: u32, sides: u32) -> PoolRoll {
    PoolRoll::evaluate(dice.roll_pool(pool, sides), difficulty)
}

/// Rolls an uncontested pool (damage, soak): successes only, ones ignored.
pub fn roll_successes(
    dice: &mut dyn DiceRoller,
    pool: u32,
    difficulty: u32,
    sides: u32,
) -> (Vec<u32>, u32) {
    let faces = dice.roll_pool(pool, sides);
    let successes = faces.iter().filter(|&&f| f >= difficulty).count() as u32;
    (faces, successes)
}

/// Attacker successes minus defender successes, floored at zero.
pub fn net_successes(attacker: i32, defender: i32) -> u32 {
    (attacker - defender).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedDice;

    #[test]
    fn pool_subtracts_penalty_and_floors_at_one() {
        assert_eq!(dice_pool(3, 2, 1), 4);
        assert_eq!(dice_pool(1, 0, 1), 1);
        assert_eq!(dice_pool(2, 0, 10), 1);
    }

    #[test]
    fn ones_cancel_successes() {
        let attack = PoolRoll::evaluate(vec![6, 8, 10, 1, 3], 6);
        assert_eq!(attack.successes, 2);
        let defense = PoolRoll::evaluate(vec![7, 2], 6);
        assert_eq!(net_successes(attack.successes, defense.successes), 1);
    }

    #[test]
    fn negative_successes_are_kept_and_flag_a_botch() {
        let roll = PoolRoll::evaluate(vec![1, 1, 4], 6);
        assert_eq!(roll.successes, -2);
        assert!(roll.is_botch());
        assert!(!PoolRoll::evaluate(vec![2, 3], 6).is_botch());
        assert_eq!(net_successes(-2, 0), 0);
    }

    #[test]
    fn uncontested_rolls_ignore_ones() {
        let mut dice = ScriptedDice::new([1, 6, 7, 2]);
        let (faces, successes) = roll_successes(&mut dice, 4, 6, 10);
        assert_eq!(faces, vec![1, 6, 7, 2]);
        assert_eq!(successes, 2);
    }
}
