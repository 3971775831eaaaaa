//! Award computation for correct answers.
//!
//! `award = round(multiplier × (28 + speed + combo))`, where the speed bonus
//! grows with the time left and the combo bonus with the streak length.

/// Flat points for any correct answer.
pub const BASE_AWARD: u32 = 28;
/// Speed bonus earned per remaining second.
pub const SPEED_FACTOR: f64 = 1.6;
pub const SPEED_BONUS_CAP: u32 = 45;
/// Combo bonus per streak step.
pub const COMBO_STEP: u32 = 7;
pub const COMBO_BONUS_CAP: u32 = 70;

/// `clamp(floor(seconds × 1.6), 0, 45)`.
pub fn speed_bonus(seconds_remaining: u32) -> u32 {
    let raw = (seconds_remaining as f64 * SPEED_FACTOR).floor() as u32;
    raw.min(SPEED_BONUS_CAP)
}

/// `clamp(combo × 7, 0, 70)`, where `combo` already includes this answer.
pub fn combo_bonus(combo: u32) -> u32 {
    combo.saturating_mul(COMBO_STEP).min(COMBO_BONUS_CAP)
}

/// Points for a correct answer that brings the streak to `new_combo`.
pub fn award(multiplier: f64, seconds_remaining: u32, new_combo: u32) -> u32 {
    let raw = BASE_AWARD + speed_bonus(seconds_remaining) + combo_bonus(new_combo);
    (multiplier * raw as f64).round().max(0.0) as u32
}
