use std::fmt::Write as _;

/// Smooth step from 0 to 1 centred on `edge` with width `penumbra`.
fn sigmoid(x: f64, edge: f64, penumbra: f64) -> f64 {
    1.0 / (1.0 + (-(x - edge) / penumbra).exp())
}

/// Flat field of half-width `half_width` with soft shoulders.
fn profile(x: f64, half_width: f64, penumbra: f64) -> f64 {
    sigmoid(x, -half_width, penumbra) * sigmoid(-x, -half_width, penumbra)
}

/// Build-up then exponential fall-off, peaking near `dmax`.
fn depth_dose(depth: f64, dmax: f64, mu: f64) -> f64 {
    let build_up = 1.0 - (-depth / (dmax / 3.0)).exp();
    build_up * (-mu * (depth - dmax).max(0.0)).exp()
}

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_scan(
    out: &mut String,
    number: usize,
    curve_type: &str,
    depth: f64,
    samples: &[(f64, f64)],
) -> std::fmt::Result {
    writeln!(out, "\tBEGIN_SCAN  {number}")?;
    writeln!(out, "\t\tTASK_NAME=tbaScan")?;
    writeln!(out, "\t\tSCAN_CURVETYPE={curve_type}")?;
    writeln!(out, "\t\tSCAN_DEPTH={depth:.2}")?;
    writeln!(out, "\t\tBEGIN_DATA")?;
    for (distance, dose) in samples {
        writeln!(out, "\t\t\t{distance:.2}\t{dose:.4E}\t0.00")?;
    }
    writeln!(out, "\t\tEND_DATA")?;
    writeln!(out, "\tEND_SCAN  {number}")
}

fn main() -> std::fmt::Result {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_scan.mcc".to_string());
    let mut rng = SimpleRng::new(42);

    let depths = [15.0, 50.0, 100.0, 200.0];
    let half_width = 50.0;
    let mu = 0.0045;
    let dmax = 15.0;

    let mut text = String::new();
    writeln!(text, "BEGIN_SCAN_DATA")?;
    writeln!(text, "\tFORMAT=MEPHISTO")?;
    writeln!(text, "\tFILE_CREATION_DATE=01-Jan-2015 09:00:00")?;

    let mut number = 1;

    // Cross-plane profiles first so reordering has something to do.
    for &depth in &depths {
        let scale = depth_dose(depth, dmax, mu);
        let width = half_width * (1000.0 + depth) / 1000.0;
        let samples: Vec<(f64, f64)> = (-40..=40)
            .map(|i| {
                let x = i as f64 * 2.0;
                let dose = 100.0 * scale * profile(x + 0.4, width, 3.0) + rng.gauss(0.0, 0.2);
                (x, dose.max(0.0))
            })
            .collect();
        write_scan(&mut text, number, "CROSSPLANE_PROFILE", depth, &samples)?;
        number += 1;
    }

    let pdd: Vec<(f64, f64)> = (0..=150)
        .map(|i| {
            let z = i as f64 * 2.0;
            (z, 100.0 * depth_dose(z, dmax, mu) + rng.gauss(0.0, 0.2))
        })
        .collect();
    write_scan(&mut text, number, "PDD", 0.0, &pdd)?;
    number += 1;

    for &depth in &depths {
        let scale = depth_dose(depth, dmax, mu);
        let width = half_width * (1000.0 + depth) / 1000.0;
        let samples: Vec<(f64, f64)> = (-40..=40)
            .map(|i| {
                let x = i as f64 * 2.0;
                let dose = 100.0 * scale * profile(x - 0.6, width, 3.5) + rng.gauss(0.0, 0.2);
                (x, dose.max(0.0))
            })
            .collect();
        write_scan(&mut text, number, "INPLANE_PROFILE", depth, &samples)?;
        number += 1;
    }

    writeln!(text, "END_SCAN_DATA")?;

    if let Err(e) = std::fs::write(&output_path, &text) {
        eprintln!("Failed to write {output_path}: {e}");
        std::process::exit(1);
    }

    println!(
        "Wrote {} scans ({} depths, one PDD) to {output_path}",
        number - 1,
        depths.len()
    );
    Ok(())
}
