//! Synthetic reading generator
//!
//! Produces readings shaped like the ones the building sensors report:
//! analog temperature, humidity and pressure values, plus digital
//! equipment status for fans, rotors and pipes.

use crate::query::round2;
use crate::store::{NewReading, SensorType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Physical sensors per floor
pub const SENSORS_PER_FLOOR: i64 = 5;

const TEMPERATURE_RANGE: std::ops::Range<f64> = 20.0..35.0;
const ANALOG_RANGE: std::ops::Range<f64> = 30.0..60.0;

/// Random reading source over `buildings` x `floors`
pub struct ReadingGenerator {
    rng: StdRng,
    buildings: u32,
    floors: u32,
}

impl ReadingGenerator {
    /// Create a generator seeded from the OS
    pub fn new(buildings: u32, floors: u32) -> Self {
        Self::with_rng(StdRng::from_os_rng(), buildings, floors)
    }

    /// Create a reproducible generator
    pub fn with_seed(seed: u64, buildings: u32, floors: u32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), buildings, floors)
    }

    fn with_rng(rng: StdRng, buildings: u32, floors: u32) -> Self {
        Self {
            rng,
            buildings: buildings.max(1),
            floors: floors.max(1),
        }
    }

    /// Generate one reading stamped with the current time
    pub fn next_reading(&mut self) -> NewReading {
        let building = self.rng.random_range(1..=self.buildings).to_string();
        let floor = self.rng.random_range(1..=self.floors) as i64;
        let sensor_id = self.rng.random_range(1..=SENSORS_PER_FLOOR);
        let index = self.rng.random_range(0..SensorType::BUILTIN.len());
        let sensor_type = SensorType::BUILTIN[index].clone();

        match sensor_type {
            SensorType::Digital => {
                let running = self.rng.random_bool(0.5);
                let fan = self.on_off();
                let rotor = self.on_off();
                let pipe = self.on_off();

                NewReading::new(building, floor, sensor_type, Some(if running { 1.0 } else { 0.0 }))
                    .sensor_id(sensor_id)
                    .status(if running { "ON" } else { "OFF" })
                    .equipment(fan, rotor, pipe)
                    .fan_id(format!("FAN-{}", sensor_id))
            }
            SensorType::Temperature => {
                let value = round2(self.rng.random_range(TEMPERATURE_RANGE));
                NewReading::new(building, floor, sensor_type, Some(value)).sensor_id(sensor_id)
            }
            _ => {
                let value = round2(self.rng.random_range(ANALOG_RANGE));
                NewReading::new(building, floor, sensor_type, Some(value)).sensor_id(sensor_id)
            }
        }
    }

    /// Generate `size` readings
    pub fn batch(&mut self, size: usize) -> Vec<NewReading> {
        (0..size).map(|_| self.next_reading()).collect()
    }

    fn on_off(&mut self) -> &'static str {
        if self.rng.random_bool(0.5) {
            "ON"
        } else {
            "OFF"
        }
    }
}
