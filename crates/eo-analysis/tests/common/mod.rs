//! Synthetic datasets shared by the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use eo_core::{DataFrame, DataFrameBuilder, Series};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use serde_json::Value;

pub fn parse(json: &str) -> Value {
    serde_json::from_str(json).expect("router output is valid JSON")
}

fn standard_normal(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(rng)).collect()
}

/// Error structure of a simulated cross-section
#[derive(Clone, Copy, Debug)]
pub enum Errors {
    /// iid N(0, 1)
    Homoskedastic,
    /// Standard deviation proportional to `x1`
    Heteroskedastic,
    /// AR(1) with coefficient 0.9 in row order
    Autocorrelated,
}

/// `y = 1 + 2 x1 - 0.5 x2 + e` with `x1 ~ U(0, 10)`, `x2 ~ N(0, 1)`
pub fn cross_section(n: usize, errors: Errors, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let x1: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..10.0)).collect();
    let x2 = standard_normal(n, &mut rng);
    let noise = standard_normal(n, &mut rng);

    let e: Vec<f64> = match errors {
        Errors::Homoskedastic => noise,
        Errors::Heteroskedastic => noise.iter().zip(&x1).map(|(z, x)| z * x).collect(),
        Errors::Autocorrelated => {
            let mut u = vec![0.0; n];
            for t in 0..n {
                let prev = if t == 0 { 0.0 } else { u[t - 1] };
                u[t] = 0.9 * prev + noise[t];
            }
            u
        }
    };
    let y: Vec<f64> = (0..n)
        .map(|i| 1.0 + 2.0 * x1[i] - 0.5 * x2[i] + e[i])
        .collect();

    DataFrameBuilder::new()
        .with_column("y", Series::float(y))
        .unwrap()
        .with_column("x1", Series::float(x1))
        .unwrap()
        .with_column("x2", Series::float(x2))
        .unwrap()
        .build()
        .unwrap()
}

/// AR(1) around a level of 10, with a daily date column
pub fn ar1_series(n: usize, phi: f64, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let e = standard_normal(n + 50, &mut rng);
    let mut u = 0.0;
    let mut y = Vec::with_capacity(n);
    for (t, shock) in e.into_iter().enumerate() {
        u = phi * u + shock;
        if t >= 50 {
            y.push(10.0 + u);
        }
    }
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let dates = (0..n)
        .map(|d| start + chrono::Duration::days(d as i64))
        .collect::<Vec<_>>();

    DataFrameBuilder::new()
        .with_column("date", Series::datetime(dates))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap()
        .build()
        .unwrap()
}

/// Period-4 pattern on a linear trend
pub fn seasonal_series(n: usize, noise: f64, seed: u64) -> DataFrame {
    let pattern = [1.0, -1.0, 2.0, -2.0];
    let mut rng = StdRng::seed_from_u64(seed);
    let y: Vec<f64> = standard_normal(n, &mut rng)
        .into_iter()
        .enumerate()
        .map(|(t, e)| pattern[t % 4] + 0.1 * t as f64 + noise * e)
        .collect();
    DataFrameBuilder::new()
        .with_column("y", Series::float(y))
        .unwrap()
        .build()
        .unwrap()
}

/// Options for the simulated panel
#[derive(Clone, Copy)]
pub struct Sim {
    pub entities: usize,
    pub periods: usize,
    pub seed: u64,
    /// AR(1) coefficient of the idiosyncratic error
    pub ar: f64,
    /// Scale of the idiosyncratic error as a multiple of `|x1|`, 0 for iid
    pub hetero: f64,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            entities: 10,
            periods: 8,
            seed: 42,
            ar: 0.0,
            hetero: 0.0,
        }
    }
}

/// `y = 1 + 2 x1 - 1.5 x2 + a_i + u_it` with columns firm, year, x1, x2, y
pub fn panel(sim: Sim) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(sim.seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let (mut firm, mut year, mut x1, mut x2, mut y) =
        (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());

    for i in 0..sim.entities {
        let effect = normal.sample(&mut rng);
        let mut u = 0.0;
        for t in 0..sim.periods {
            let a: f64 = normal.sample(&mut rng) + 0.5 * effect;
            let b = normal.sample(&mut rng);
            let shock = normal.sample(&mut rng);
            let scale = if sim.hetero > 0.0 { sim.hetero * a.abs() } else { 1.0 };
            u = sim.ar * u + scale * shock;
            firm.push(format!("firm{:02}", i));
            year.push(2000 + t as i64);
            x1.push(a);
            x2.push(b);
            y.push(1.0 + 2.0 * a - 1.5 * b + effect + u);
        }
    }

    DataFrameBuilder::new()
        .with_column("firm", Series::string(firm))
        .unwrap()
        .with_column("year", Series::int(year))
        .unwrap()
        .with_column("x1", Series::float(x1))
        .unwrap()
        .with_column("x2", Series::float(x2))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap()
        .build()
        .unwrap()
}

/// Four entities over three periods whose effects are an exact linear
/// function of the entity mean of `x`
///
/// The random-effects variance clips to zero, so random effects equal
/// pooled OLS and the Hausman variance difference is negative.
pub fn degenerate_panel() -> DataFrame {
    let within = [-1.0, 0.0, 1.0];
    let noise = [1.0, -2.0, 1.0];
    let (mut id, mut time, mut x, mut y) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for i in 0..4 {
        let centre = 2.0 * i as f64;
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        for t in 0..3 {
            let xv = centre + within[t];
            id.push(i as i64);
            time.push(t as i64);
            x.push(xv);
            y.push(3.0 * centre + xv + 0.1 * sign * noise[t]);
        }
    }
    DataFrameBuilder::new()
        .with_column("id", Series::int(id))
        .unwrap()
        .with_column("t", Series::int(time))
        .unwrap()
        .with_column("x", Series::float(x))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap()
        .build()
        .unwrap()
}

/// Every leaf is a JSON primitive and every number is finite
pub fn assert_plain(value: &Value) {
    match value {
        Value::Number(n) => assert!(n.as_f64().is_some_and(f64::is_finite)),
        Value::Array(items) => items.iter().for_each(assert_plain),
        Value::Object(map) => map.values().for_each(assert_plain),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}
