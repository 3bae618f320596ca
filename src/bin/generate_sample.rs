//! Writes `sample_enrollment.csv`: a deterministic, cp1252-encoded,
//! `;`-separated enrollment dataset for trying the dashboard offline.

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

    /// Uniform integer in `0..=max`.
    fn up_to(&mut self, max: u32) -> u32 {
        (self.next_f64() * f64::from(max + 1)).floor() as u32
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const FIRST_NAMES: [&str; 12] = [
    "Ana", "João", "Márcia", "José", "Lúcia", "Ícaro", "Conceição", "Sérgio", "Bárbara",
    "Antônio", "Raí", "Cecília",
];
const LAST_NAMES: [&str; 8] = [
    "Araújo", "Conceição", "Gonçalves", "Sá", "Brandão", "Pereira", "Lima", "Nóbrega",
];
const SHIFTS: [&str; 2] = ["Diurno", "Noturno"];
const TERMS: [(i32, u32); 6] = [(2022, 3), (2022, 8), (2023, 3), (2023, 8), (2024, 3), (2024, 8)];

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    writer.write_record([
        "Nome",
        "Matrícula",
        "Turno",
        "Período",
        "Ingresso",
        "Ingressante",
        "Total",
        "AP",
        "RP",
        "TR",
    ])?;

    let mut rows = 0usize;
    for (student_no, first) in FIRST_NAMES.iter().enumerate() {
        for last_no in 0..3 {
            let id = student_no * 10 + last_no;
            let name = format!("{first} {}", LAST_NAMES[(last_no + student_no) % LAST_NAMES.len()]);
            let shift = SHIFTS[id % SHIFTS.len()];
            let start = (id % 3) * 2;
            let (entry_year, entry_month) = TERMS[start];
            let entry = format!("{entry_year}.{}", if entry_month < 7 { 1 } else { 2 });

            for (k, (year, month)) in TERMS.iter().enumerate().skip(start) {
                if k > start && rng.chance(0.15) {
                    continue;
                }
                let total = 3 + rng.up_to(4);
                let approved = rng.up_to(total);
                let failed = rng.up_to(total - approved);
                let withdrawn = total - approved - failed;
                // A few rows carry a malformed period to exercise coercion.
                let period = if rng.chance(0.02) {
                    "sem registro".to_string()
                } else {
                    format!("{year}-{month:02}")
                };

                writer.write_record([
                    name.clone(),
                    format!("2022{id:04}"),
                    shift.to_string(),
                    period,
                    entry.clone(),
                    if k == start { "1" } else { "0" }.to_string(),
                    total.to_string(),
                    approved.to_string(),
                    failed.to_string(),
                    withdrawn.to_string(),
                ])?;
                rows += 1;
            }
        }
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing sample rows: {}", e.error()))?;
    let text = String::from_utf8(buffer)?;
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(&text);
    anyhow::ensure!(!had_errors, "sample text is not representable in cp1252");

    let output_path = "sample_enrollment.csv";
    std::fs::write(output_path, &bytes)?;

    println!("Wrote {rows} enrollment rows to {output_path}");
    Ok(())
}
