use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::ops::Range;

use super::history::HistoryBuffer;
use crate::models::Instrument;

/// Range the opening price of every instrument is drawn from
pub const SEED_PRICE_RANGE: Range<f64> = 100.0..500.0;

/// Default bound of the per-tick random walk step, in both directions
pub const DEFAULT_MAX_STEP: f64 = 5.0;

/// Current price and rolling history of one instrument
#[derive(Debug, Clone)]
pub struct PriceState {
    current: f64,
    history: HistoryBuffer,
}

impl PriceState {
    fn seeded(price: f64) -> Self {
        Self {
            current: price,
            history: HistoryBuffer::seeded(price),
        }
    }

    /// Move to the next price. Prices never go below zero.
    fn apply(&mut self, perturbation: f64) {
        let next = (self.current + perturbation).max(0.0);
        self.current = next;
        self.history.push(next);
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        PriceSnapshot {
            current: self.current,
            history: self.history.to_vec(),
        }
    }
}

/// Owned copy of one instrument's state, detached from the simulator lock
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub current: f64,
    /// Oldest first
    pub history: Vec<f64>,
}

/// Every instrument's state as of one completed tick
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub tick: u64,
    prices: BTreeMap<Instrument, PriceSnapshot>,
}

impl MarketSnapshot {
    pub fn get(&self, instrument: &Instrument) -> Option<&PriceSnapshot> {
        self.prices.get(instrument)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Random-walk price generator for the instrument catalog
///
/// Prices are stored at full precision; rounding happens when a message is
/// built. Instruments are kept in a `BTreeMap` so that a seeded simulator
/// draws its random numbers in a stable order.
pub struct PriceSimulator {
    states: BTreeMap<Instrument, PriceState>,
    rng: StdRng,
    max_step: f64,
    ticks: u64,
}

impl PriceSimulator {
    /// Create a simulator seeded from OS entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Create a reproducible simulator
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Override the random walk step bound
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step.abs();
        self
    }

    /// Draw an opening price for each instrument in the catalog
    fn from_rng(mut rng: StdRng) -> Self {
        let states = Instrument::all()
            .map(|instrument| {
                let price = rng.random_range(SEED_PRICE_RANGE);
                (instrument, PriceState::seeded(price))
            })
            .collect();

        Self {
            states,
            rng,
            max_step: DEFAULT_MAX_STEP,
            ticks: 0,
        }
    }

    /// Advance every instrument by one independent random step
    pub fn tick(&mut self) {
        let step = self.max_step;
        for state in self.states.values_mut() {
            let perturbation = self.rng.random_range(-step..=step);
            state.apply(perturbation);
        }
        self.ticks += 1;
    }

    /// Current price and history of one instrument
    pub fn snapshot(&self, instrument: &Instrument) -> Option<PriceSnapshot> {
        self.states.get(instrument).map(PriceState::snapshot)
    }

    /// State of the whole catalog as of the last completed tick
    pub fn market_snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            tick: self.ticks,
            prices: self
                .states
                .iter()
                .map(|(instrument, state)| (*instrument, state.snapshot()))
                .collect(),
        }
    }

    pub fn state(&self, instrument: &Instrument) -> Option<&PriceState> {
        self.states.get(instrument)
    }

    /// Number of completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for PriceSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::history::HISTORY_CAPACITY;

    #[test]
    fn test_initial_prices_in_seed_range() {
        for seed in 0..50 {
            let simulator = PriceSimulator::with_seed(seed);
            for instrument in Instrument::all() {
                let snapshot = simulator.snapshot(&instrument).unwrap();
                assert!(snapshot.current >= 100.0, "{} below range", snapshot.current);
                assert!(snapshot.current < 500.0, "{} above range", snapshot.current);
                assert_eq!(snapshot.history, vec![snapshot.current]);
            }
        }
    }

    #[test]
    fn test_every_catalog_instrument_is_simulated() {
        let simulator = PriceSimulator::with_seed(7);
        let market = simulator.market_snapshot();
        assert_eq!(market.len(), 5);
        assert_eq!(market.tick, 0);
        for instrument in Instrument::all() {
            assert!(market.get(&instrument).is_some());
        }
    }

    #[test]
    fn test_tick_moves_within_step_bound() {
        let mut simulator = PriceSimulator::with_seed(42);
        let goog = Instrument::parse("GOOG").unwrap();
        let before = simulator.snapshot(&goog).unwrap().current;

        simulator.tick();

        let after = simulator.snapshot(&goog).unwrap();
        assert!((after.current - before).abs() <= DEFAULT_MAX_STEP + 1e-9);
        assert_eq!(after.history, vec![before, after.current]);
        assert_eq!(simulator.ticks(), 1);
    }

    #[test]
    fn test_history_last_matches_current_after_tick() {
        let mut simulator = PriceSimulator::with_seed(3);
        for _ in 0..25 {
            simulator.tick();
            for instrument in Instrument::all() {
                let state = simulator.state(&instrument).unwrap();
                assert_eq!(state.history().last(), Some(state.current()));
            }
        }
    }

    #[test]
    fn test_price_never_negative() {
        let mut simulator = PriceSimulator::with_seed(11).with_max_step(10_000.0);
        for _ in 0..200 {
            simulator.tick();
            for instrument in Instrument::all() {
                let snapshot = simulator.snapshot(&instrument).unwrap();
                assert!(snapshot.current >= 0.0);
                assert!(snapshot.history.iter().all(|p| *p >= 0.0));
            }
        }
    }

    #[test]
    fn test_history_bounded_after_fifteen_ticks() {
        let mut simulator = PriceSimulator::with_seed(5);
        let tsla = Instrument::parse("TSLA").unwrap();
        let mut observed = vec![simulator.snapshot(&tsla).unwrap().current];

        for _ in 0..15 {
            simulator.tick();
            let snapshot = simulator.snapshot(&tsla).unwrap();
            assert!(snapshot.history.len() <= HISTORY_CAPACITY);
            observed.push(snapshot.current);
        }

        let history = simulator.snapshot(&tsla).unwrap().history;
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history, observed[observed.len() - HISTORY_CAPACITY..].to_vec());
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = PriceSimulator::with_seed(99);
        let mut b = PriceSimulator::with_seed(99);
        for _ in 0..5 {
            a.tick();
            b.tick();
        }
        for instrument in Instrument::all() {
            assert_eq!(a.snapshot(&instrument), b.snapshot(&instrument));
        }
    }

    #[test]
    fn test_zero_step_keeps_prices_flat() {
        let mut simulator = PriceSimulator::with_seed(1).with_max_step(0.0);
        let meta = Instrument::parse("META").unwrap();
        let opening = simulator.snapshot(&meta).unwrap().current;
        simulator.tick();
        simulator.tick();
        assert_eq!(simulator.snapshot(&meta).unwrap().history, vec![opening; 3]);
    }
}
