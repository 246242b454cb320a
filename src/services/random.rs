use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Source of the simulation's random decisions.
pub trait Dice: Send + Sync {
    /// Uniform value in `[0, 1)`. Success rolls compare `roll() < rate`.
    fn roll(&self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&self, len: usize) -> usize;

    fn millis(&self, range: RangeInclusive<u64>) -> u64;

    fn between(&self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.roll()
    }

    fn code(&self, len: usize) -> String {
        (0..len)
            .map(|_| CODE_ALPHABET[self.index(CODE_ALPHABET.len())] as char)
            .collect()
    }
}

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
    fn now(&self) -> NaiveDateTime;
}

pub struct ThreadDice;

impl Dice for ThreadDice {
    fn roll(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn millis(&self, range: RangeInclusive<u64>) -> u64 {
        if range.is_empty() {
            return *range.start();
        }
        rand::thread_rng().gen_range(range)
    }
}

pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Dice that replays queued rolls, then repeats a fallback value.
/// Indices and delays always take the lowest option.
pub struct ScriptedDice {
    rolls: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
            fallback,
        }
    }

    /// Every success roll passes.
    pub fn always_succeed() -> Self {
        Self::new([], 0.0)
    }

    /// Every success roll fails, whatever the rate.
    pub fn always_fail() -> Self {
        Self::new([], 1.0)
    }
}

impl Dice for ScriptedDice {
    fn roll(&self) -> f64 {
        self.rolls
            .lock()
            .ok()
            .and_then(|mut rolls| rolls.pop_front())
            .unwrap_or(self.fallback)
    }

    fn index(&self, _len: usize) -> usize {
        0
    }

    fn millis(&self, range: RangeInclusive<u64>) -> u64 {
        *range.start()
    }

    fn between(&self, low: f64, _high: f64) -> f64 {
        low
    }
}

/// Clock whose sleeps return immediately and advance its own time.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += chrono::Duration::milliseconds(duration.as_millis() as i64);
        }
        tokio::task::yield_now().await;
    }

    fn now(&self) -> NaiveDateTime {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|_| Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_dice_replays_then_falls_back() {
        let dice = ScriptedDice::new([0.2, 0.9], 0.5);
        assert_eq!(dice.roll(), 0.2);
        assert_eq!(dice.roll(), 0.9);
        assert_eq!(dice.roll(), 0.5);
        assert_eq!(dice.roll(), 0.5);
    }

    #[test]
    fn test_thread_dice_ranges() {
        let dice = ThreadDice;
        for _ in 0..200 {
            let r = dice.roll();
            assert!((0.0..1.0).contains(&r));
            assert!(dice.index(4) < 4);
            let ms = dice.millis(10..=20);
            assert!((10..=20).contains(&ms));
        }
    }

    #[test]
    fn test_code_is_uppercase_alphanumeric() {
        let code = ThreadDice.code(8);
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_manual_clock_advances_on_sleep() {
        let start = NaiveDateTime::parse_from_str("2025-06-10 08:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let clock = ManualClock::starting_at(start);
        clock.sleep(Duration::from_millis(1500)).await;
        assert_eq!(clock.now(), start + chrono::Duration::milliseconds(1500));
    }
}
