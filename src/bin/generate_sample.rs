//! Writes a deterministic demo season (points + transfers CSVs) that the
//! dashboard can open directly:
//!
//! ```text
//! cargo run --bin generate_sample
//! cargo run -- sample_points.csv sample_transfers.csv
//! ```

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

fn main() {
    let mut rng = SimpleRng::new(42);

    // (team, mean points per match) – spread wide enough that the
    // leaderboard has clear tiers plus one likely tie to exercise min-rank.
    let teams: [(&str, f64); 8] = [
        ("Boundary Hunters", 72.0),
        ("Yorker Kings", 68.0),
        ("Silly Point Society", 64.0),
        ("Doosra Dynamos", 64.0),
        ("Flannelled Fools", 58.0),
        ("Reverse Sweepers", 55.0),
        ("Night Watchmen", 51.0),
        ("Tail Enders", 45.0),
    ];
    let matches = 14u32;

    let mut points = csv::Writer::from_path("sample_points.csv").expect("create points CSV");
    let mut transfers =
        csv::Writer::from_path("sample_transfers.csv").expect("create transfers CSV");

    let mut header = vec!["Match".to_string()];
    header.extend(teams.iter().map(|(name, _)| name.to_string()));
    points.write_record(&header).expect("write points header");
    transfers
        .write_record(&header)
        .expect("write transfers header");

    for match_id in 1..=matches {
        let mut point_row = vec![match_id.to_string()];
        let mut transfer_row = vec![match_id.to_string()];

        for &(_, mean) in &teams {
            let score = rng.gauss(mean, 18.0).round().max(0.0);
            point_row.push(format!("{score:.0}"));

            // Most weeks no transfer, occasionally a reshuffle of 1–3.
            let roll = rng.next_f64();
            let moves = if roll < 0.55 {
                0
            } else if roll < 0.85 {
                1
            } else if roll < 0.96 {
                2
            } else {
                3
            };
            transfer_row.push(moves.to_string());
        }

        points.write_record(&point_row).expect("write points row");
        transfers
            .write_record(&transfer_row)
            .expect("write transfers row");
    }

    points.flush().expect("flush points CSV");
    transfers.flush().expect("flush transfers CSV");

    println!(
        "Wrote {matches} matches for {} teams to sample_points.csv and sample_transfers.csv",
        teams.len()
    );
}
