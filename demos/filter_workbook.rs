use std::env;

use agesheet::{
    config::{DEFAULT_EXPORT_NAME, FilterConfig},
    error::AgeSheetError,
    pipeline, report,
};

// cargo run --example filter_workbook -- leden.xlsx [filter.toml] [output.xlsx]
fn main() -> Result<(), AgeSheetError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: filter_workbook <input.xlsx|input.csv> [filter.toml] [output.xlsx]");
        std::process::exit(2);
    };
    let config = match args.next() {
        Some(path) => FilterConfig::load(path)?,
        None => FilterConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());

    let outcome = pipeline::process_file(&input, &config)?;
    println!("{}", report::render(&outcome.result));
    outcome.write_export(&output)?;
    println!("Filtered workbook written to {output}");
    Ok(())
}
