//! Write a synthetic `species.out` for trying the analyser without a
//! simulation at hand.
//!
//! ```text
//! cargo run --bin generate_sample -- [OUTPUT] [FRAMES]
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use log::info;

/// Unimolecular and oxidation steps: (reactants, products, probability per
/// molecule per frame).
const REACTIONS: &[(&[&str], &[&str], f64)] = &[
    (&["C45H92"], &["C16H34", "C29H58"], 0.06),
    (&["C16H34"], &["C8H16", "C8H18"], 0.05),
    (&["C8H18"], &["C2H4", "C6H14"], 0.04),
    (&["C6H14"], &["C2H4", "C4H10"], 0.04),
    (&["C4H10"], &["CH4", "C3H6"], 0.03),
    (&["C8H16"], &["C2H4", "C2H4", "C2H4", "C2H4"], 0.02),
    (&["C2H4", "O2", "O2", "O2"], &["CO2", "CO2", "H2O", "H2O"], 0.01),
];

const INITIAL: &[(&str, u64)] = &[("C45H92", 12), ("C16H34", 30), ("O2", 60)];

/// Timesteps between two frames.
const FRAME_STRIDE: u64 = 500;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Species populations in order of first appearance.
#[derive(Default)]
struct Population {
    counts: Vec<(String, u64)>,
}

impl Population {
    fn get(&self, name: &str) -> u64 {
        self.counts
            .iter()
            .find(|(n, _)| n == name)
            .map_or(0, |(_, c)| *c)
    }

    fn add(&mut self, name: &str, delta: u64) {
        match self.counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, c)) => *c += delta,
            None => self.counts.push((name.to_string(), delta)),
        }
    }

    fn remove(&mut self, name: &str, delta: u64) {
        if let Some((_, c)) = self.counts.iter_mut().find(|(n, _)| n == name) {
            *c = c.saturating_sub(delta);
        }
    }

    /// Whether every reactant of a step is available.
    fn can_react(&self, reactants: &[&str]) -> bool {
        reactants.iter().all(|r| {
            let needed = reactants.iter().filter(|x| *x == r).count() as u64;
            self.get(r) >= needed
        })
    }

    /// Advance one frame: each molecule of a step's first reactant fires
    /// with the step's probability while the other reactants last.
    fn step(&mut self, rng: &mut SimpleRng) {
        for (reactants, products, p) in REACTIONS {
            let candidates = self.get(reactants[0]);
            for _ in 0..candidates {
                if rng.next_f64() >= *p || !self.can_react(reactants) {
                    continue;
                }
                for r in reactants.iter() {
                    self.remove(r, 1);
                }
                for prod in products.iter() {
                    self.add(prod, 1);
                }
            }
        }
    }

    fn present(&self) -> impl Iterator<Item = &(String, u64)> {
        self.counts.iter().filter(|(_, c)| *c > 0)
    }

    fn write_frame(&self, out: &mut impl Write, timestep: u64) -> std::io::Result<()> {
        let moles: u64 = self.present().map(|(_, c)| c).sum();
        let specs = self.present().count();

        write!(out, "# Timestep No_Moles No_Specs")?;
        for (name, _) in self.present() {
            write!(out, " {name}")?;
        }
        writeln!(out)?;

        write!(out, "  {timestep} {moles} {specs}")?;
        for (_, count) in self.present() {
            write!(out, " {count}")?;
        }
        writeln!(out)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "species.out".to_string());
    let frames: u64 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("frame count '{s}'"))?,
        None => 200,
    };

    let mut rng = SimpleRng::new(42);
    let mut population = Population::default();
    for (name, count) in INITIAL {
        population.add(name, *count);
    }

    let file = File::create(&output_path).with_context(|| format!("creating {output_path}"))?;
    let mut out = BufWriter::new(file);
    for frame in 0..frames {
        population
            .write_frame(&mut out, frame * FRAME_STRIDE)
            .with_context(|| format!("writing frame {frame}"))?;
        population.step(&mut rng);
    }
    out.flush().context("flushing output")?;

    info!(
        "Wrote {frames} frames ({} species seen) to {output_path}",
        population.counts.len()
    );
    Ok(())
}
