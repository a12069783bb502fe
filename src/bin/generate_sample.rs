//! Writes a synthetic registry export for trying the dashboard without the
//! real workbook. The file mimics the registry layout: three title lines,
//! then a header with the workbook's labels (some wrapped over two lines),
//! then one row per project with the occasional blank or malformed cell.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Generate a sample project CSV
#[derive(Debug, Parser)]
struct Args {
    /// Output file
    #[arg(default_value = "sample_projects.csv")]
    output: PathBuf,

    /// Number of project rows
    #[arg(long, default_value_t = 400)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// True roughly once every `n` calls.
    fn one_in(&mut self, n: usize) -> bool {
        self.below(n) == 0
    }
}

/// (registry, project id prefix)
const REGISTRIES: [(&str, &str); 5] = [
    ("VCS", "VCS"),
    ("GOLD", "GS"),
    ("ACR", "ACR"),
    ("CAR", "CAR"),
    ("ART", "ART"),
];

/// (scope, [(type, reduction / removal)])
const SCOPES: [(&str, &[(&str, &str)]); 5] = [
    (
        "Forestry & Land Use",
        &[
            ("REDD+", "Reduction"),
            ("Improved Forest Management", "Mixed"),
            ("Afforestation/Reforestation", "Removal"),
        ],
    ),
    (
        "Renewable Energy",
        &[("Wind", "Reduction"), ("Solar", "Reduction"), ("Hydropower", "Reduction")],
    ),
    (
        "Household & Community",
        &[("Cookstoves", "Reduction"), ("Clean Water", "Reduction")],
    ),
    ("Waste Management", &[("Landfill Methane", "Reduction")]),
    ("Carbon Capture & Storage", &[("Direct Air Capture", "Removal")]),
];

/// (region, countries as registries spell them)
const REGIONS: [(&str, &[&str]); 5] = [
    ("Africa", &["Kenya", "Uganda", "Democratic Republic of the Congo"]),
    ("Asia", &["India", "China", "Vietnam", "Indonesia"]),
    ("South America", &["Brazil", "Peru", "Colombia"]),
    ("North America", &["United States", "Mexico"]),
    ("Europe", &["Turkey", "Germany"]),
];

const HEADER: [&str; 17] = [
    "Project ID",
    "Project Name",
    "Voluntary Registry",
    "Voluntary Status",
    "Scope",
    "Type",
    "Reduction / Removal",
    "Methodology / Protocol",
    "Region",
    "Country",
    "State",
    "Project Developer",
    "Total Credits\nIssued",
    "Total Credits\nRetired",
    "Total Credits Remaining",
    "Total Buffer Pool Deposits",
    "First Year of Project (Vintage)",
];

fn project_row(rng: &mut SimpleRng, n: usize) -> Vec<String> {
    let (registry, prefix) = *rng.pick(&REGISTRIES);
    let (scope, types) = *rng.pick(&SCOPES);
    let (kind, redrem) = *rng.pick(types);
    let (region, countries) = *rng.pick(&REGIONS);
    let country = *rng.pick(countries);

    let issued = (rng.next_f64() * 2_000_000.0).round();
    let retired = (issued * rng.next_f64()).round();
    let remaining = issued - retired;
    let buffer = (issued * 0.1 * rng.next_f64()).round();
    let vintage = 1995 + rng.below(30);

    let mut id = format!("{prefix}{}", 1000 + n);
    if rng.one_in(60) {
        id.clear();
    }
    let issued = if rng.one_in(40) {
        "N/A".to_string()
    } else {
        issued.to_string()
    };
    let country = if rng.one_in(50) { "" } else { country };
    let buffer = if rng.one_in(70) { -buffer } else { buffer };
    let vintage = if rng.one_in(25) {
        String::new()
    } else {
        vintage.to_string()
    };

    vec![
        id,
        format!("{kind} project {n}"),
        registry.to_string(),
        rng.pick(&["Registered", "Completed", "Listed"]).to_string(),
        scope.to_string(),
        kind.to_string(),
        redrem.to_string(),
        format!("{registry}-M{:03}", rng.below(40)),
        region.to_string(),
        country.to_string(),
        String::new(),
        format!("Developer {}", rng.below(25)),
        issued,
        retired.to_string(),
        remaining.to_string(),
        buffer.to_string(),
        vintage,
    ]
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    // Title block above the header, as in the registry workbook.
    writer.write_record(["Voluntary Registry Offsets Database"])?;
    writer.write_record(["Synthetic sample generated for the carbon dashboard"])?;
    writer.write_record(["Source: generate_sample"])?;
    writer.write_record(HEADER)?;

    for n in 0..args.rows {
        writer.write_record(project_row(&mut rng, n))?;
    }
    writer.flush()?;

    println!(
        "Wrote {} projects to {} (open with --skip-rows 3)",
        args.rows,
        args.output.display()
    );
    Ok(())
}
