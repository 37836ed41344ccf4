//! Hermes Args - demo dan benchmark marshaling argument job
//!
//! Usage:
//!   cargo run --release -- [OPTIONS]
//!
//! Log level diatur lewat `RUST_LOG` (misalnya `RUST_LOG=debug`).

use std::time::Instant;

use hermes_args::{
    ArgumentError, ArgumentMap, ArgumentValue, Arguments, ArgumentsConfig, CustomArgumentType,
    CustomRegistry, DeserializationError, Entity, InMemoryLocator,
};

/// Konfigurasi demo
struct DemoConfig {
    iterations: usize,
    max_depth: usize,
    verbose: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            max_depth: hermes_args::config::DEFAULT_MAX_DEPTH,
            verbose: false,
        }
    }
}

/// Entity contoh: akun yang di-resolve lewat global id
#[derive(Debug)]
struct Account {
    id: u64,
}

impl Entity for Account {
    fn model_name(&self) -> &str {
        "Account"
    }

    fn id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

/// Custom type contoh: nominal uang dalam minor unit
#[derive(Debug, PartialEq)]
struct Money {
    cents: i64,
    currency: String,
}

impl CustomArgumentType for Money {
    const TYPE_TAG: &'static str = "Money";

    fn serialize(&self) -> ArgumentValue {
        ArgumentMap::new()
            .with("cents", self.cents)
            .with("currency", self.currency.as_str())
            .into()
    }

    fn deserialize(payload: ArgumentValue) -> Result<Self, DeserializationError> {
        let invalid = |reason: &str| DeserializationError::Payload {
            tag: Self::TYPE_TAG.to_string(),
            reason: reason.to_string(),
        };

        let map = payload.as_map().ok_or_else(|| invalid("expected mapping"))?;
        let cents = map
            .get_str("cents")
            .and_then(ArgumentValue::as_integer)
            .and_then(|i| i64::try_from(i).ok())
            .ok_or_else(|| invalid("missing cents"))?;
        let currency = map
            .get_str("currency")
            .and_then(ArgumentValue::as_str)
            .ok_or_else(|| invalid("missing currency"))?;

        Ok(Self {
            cents,
            currency: currency.to_string(),
        })
    }
}

fn main() {
    env_logger::init();

    let config = parse_args();

    if let Err(e) = run_demo(config) {
        eprintln!("❌ Demo error: {}", e);
        std::process::exit(1);
    }
}

fn run_demo(config: DemoConfig) -> Result<(), ArgumentError> {
    println!("🚀 Hermes Args - Job Argument Marshaling");
    println!("========================================\n");

    let arguments_config = ArgumentsConfig::new().with_max_depth(config.max_depth);
    let locator = InMemoryLocator::new(arguments_config.app.as_str())
        .with(Account { id: 42 })?;
    let registry = CustomRegistry::new().with::<Money>()?;

    let arguments = Arguments::builder()
        .config(arguments_config)
        .resolver(locator)
        .registry(registry)
        .build()?;

    let args = sample_arguments();

    let text = arguments.serialize_json(&args)?;
    println!("📦 Wire payload ({} bytes):", text.len());
    println!("   {}\n", text);

    let restored = arguments.deserialize_json(&text)?;
    if restored != args {
        eprintln!("⚠️  Round trip mismatch");
        if config.verbose {
            eprintln!("   expected: {:?}", args);
            eprintln!("   actual:   {:?}", restored);
        }
    } else {
        println!("✅ Round trip OK ({} arguments)\n", restored.len());
    }

    benchmark(&arguments, &args, config.iterations)?;

    println!("\n✅ All benchmarks complete!");
    Ok(())
}

fn sample_arguments() -> Vec<ArgumentValue> {
    vec![
        ArgumentValue::from(1),
        ArgumentValue::from("welcome_email"),
        ArgumentValue::entity(Account { id: 42 }),
        ArgumentMap::new()
            .with(ArgumentValue::symbol("retries"), 3)
            .with("queue", "mailers")
            .into(),
        ArgumentMap::with_indifferent_access()
            .with("locale", "id")
            .into(),
        ArgumentValue::custom(Money {
            cents: 125_000,
            currency: "IDR".to_string(),
        }),
    ]
}

fn benchmark(
    arguments: &Arguments,
    args: &[ArgumentValue],
    iterations: usize,
) -> Result<(), ArgumentError> {
    println!("📊 Marshaling Benchmark");
    println!("-----------------------");

    let start = Instant::now();
    for _ in 0..iterations {
        arguments.serialize(args)?;
    }
    let serialize_duration = start.elapsed();

    let wire = arguments.serialize(args)?;

    let start = Instant::now();
    for _ in 0..iterations {
        arguments.deserialize(&wire)?;
    }
    let deserialize_duration = start.elapsed();

    let text = arguments.serialize_json(args)?;

    let start = Instant::now();
    for _ in 0..iterations {
        arguments.deserialize_json(&text)?;
    }
    let json_duration = start.elapsed();

    let per_op = |d: std::time::Duration| d.as_nanos() as f64 / iterations.max(1) as f64;

    println!("  Iterations: {}", iterations);
    println!(
        "  Serialize latency:        {:.2} ns/op ({:.3} μs/op)",
        per_op(serialize_duration),
        per_op(serialize_duration) / 1000.0
    );
    println!(
        "  Deserialize latency:      {:.2} ns/op ({:.3} μs/op)",
        per_op(deserialize_duration),
        per_op(deserialize_duration) / 1000.0
    );
    println!(
        "  JSON load+decode latency: {:.2} ns/op ({:.3} μs/op)",
        per_op(json_duration),
        per_op(json_duration) / 1000.0
    );

    Ok(())
}

fn parse_args() -> DemoConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DemoConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--iterations" | "-n" => {
                if i + 1 < args.len() {
                    config.iterations = args[i + 1].parse().unwrap_or(config.iterations);
                    i += 1;
                }
            }
            "--max-depth" => {
                if i + 1 < args.len() {
                    config.max_depth = args[i + 1].parse().unwrap_or(config.max_depth);
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!("Hermes Args - Job Argument Marshaling Demo\n");
                println!("Usage: hermes-args [OPTIONS]\n");
                println!("Options:");
                println!("  -n, --iterations <N>  Benchmark iterations (default: 100000)");
                println!("      --max-depth <N>   Maximum nesting depth (default: 100)");
                println!("  -v, --verbose         Verbose output");
                println!("  -h, --help            Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}
