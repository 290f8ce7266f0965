//! Grow-room climate simulation
//!
//! Writes a synthetic report-log dump (JSON array of raw log rows) to stdout,
//! in the same shape the device cloud returns. Temperature is emitted in
//! tenths of a degree like the real sensor.
//!
//! # Usage
//! ```bash
//! ./simulation --hours 72 --interval-secs 600 > dump.json
//! growmonitor report --device sim --range 3d --input dump.json --points
//! ```

use chrono::Utc;
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
use std::io::{self, Write};

use growmonitor::acquisition::RawLog;
use growmonitor::config::defaults::{HUMIDITY_CODE, TEMPERATURE_CODE, TEMPERATURE_DIVISOR};

/// Daytime mean temperature (°C)
const BASE_TEMPERATURE: f64 = 24.0;
/// Day/night temperature swing amplitude (°C)
const TEMPERATURE_SWING: f64 = 3.0;
/// Mean relative humidity (%)
const BASE_HUMIDITY: f64 = 58.0;
/// Humidity swing amplitude, opposite phase to temperature (%)
const HUMIDITY_SWING: f64 = 8.0;
/// Probability that a single reading is missing
const DROPOUT_RATE: f64 = 0.02;

#[derive(Parser, Debug)]
#[command(name = "grow-simulation")]
#[command(about = "Synthetic grow-room telemetry for growmonitor testing")]
#[command(version = "1.0")]
struct Args {
    /// Simulated span in hours, ending now (1-8760)
    #[arg(short = 'H', long, default_value = "24", value_parser = clap::value_parser!(u32).range(1..=8760))]
    hours: u32,

    /// Seconds between readings (1-86400)
    #[arg(short, long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..=86_400))]
    interval_secs: u64,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

struct Climate {
    rng: StdRng,
    temperature_noise: Normal<f64>,
    humidity_noise: Normal<f64>,
}

impl Climate {
    fn new(seed: Option<u64>) -> Result<Self, rand_distr::NormalError> {
        Ok(Self {
            rng: match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            },
            temperature_noise: Normal::new(0.0, 0.3)?,
            humidity_noise: Normal::new(0.0, 1.5)?,
        })
    }

    /// Raw rows for one instant; a sensor may skip a reading.
    fn sample(&mut self, event_time: i64) -> Vec<RawLog> {
        // Lights on from 06:00, warmest mid-afternoon
        let hour_of_day = (event_time / 1000 % 86_400) as f64 / 3600.0;
        let phase = ((hour_of_day - 9.0) / 24.0 * TAU).sin();

        let temperature = BASE_TEMPERATURE
            + TEMPERATURE_SWING * phase
            + self.temperature_noise.sample(&mut self.rng);
        let humidity = (BASE_HUMIDITY - HUMIDITY_SWING * phase
            + self.humidity_noise.sample(&mut self.rng))
        .clamp(1.0, 100.0);

        let mut rows = Vec::with_capacity(2);
        if !self.rng.gen_bool(DROPOUT_RATE) {
            rows.push(RawLog {
                code: TEMPERATURE_CODE.to_string(),
                event_time,
                value: serde_json::json!((temperature * TEMPERATURE_DIVISOR).round() as i64),
            });
        }
        if !self.rng.gen_bool(DROPOUT_RATE) {
            rows.push(RawLog {
                code: HUMIDITY_CODE.to_string(),
                event_time,
                value: serde_json::json!(humidity.round() as i64),
            });
        }
        rows
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut climate = Climate::new(args.seed)?;

    let step_ms = i64::try_from(args.interval_secs)? * 1000;
    let end = Utc::now().timestamp_millis();
    let start = end - i64::from(args.hours) * 3_600_000;

    let mut logs = Vec::new();
    let mut t = start;
    while t <= end {
        logs.extend(climate.sample(t));
        t += step_ms;
    }

    eprintln!(
        "Generated {} rows over {}h at {}s intervals",
        logs.len(),
        args.hours,
        args.interval_secs
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, &logs)?;
    writeln!(handle)?;
    Ok(())
}
