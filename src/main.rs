use anyhow::{Context, Result};
use chrono::Local;
use std::env;
use std::fs;
use std::path::PathBuf;

use rental_journal::config::CompanyConfig;
use rental_journal::data;
use rental_journal::{convert_file, ConversionRequest};

const CONFIG_ENV: &str = "RENTAL_JOURNAL_CONFIG";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 5 || args.len() > 7 {
        eprintln!(
            "Usage: cargo run -- <input_file> <mapping_file> <voucher_number> <employee_number> [template_file] [output_file]"
        );
        std::process::exit(1);
    }

    let config = match env::var(CONFIG_ENV) {
        Ok(path) => CompanyConfig::from_json_file(&path).with_context(|| format!("loading company config {}", path))?,
        Err(_) => CompanyConfig::korea_rental(),
    };

    let request = ConversionRequest::new(&args[3], &args[4]);
    request.validate()?;

    let mapping = data::load_mapping_table(&args[2]).with_context(|| format!("loading mapping table {}", args[2]))?;
    let template = match args.get(5) {
        Some(path) => Some(data::load_template(path).with_context(|| format!("loading template {}", path))?),
        None => None,
    };

    let today = Local::now().date_naive();
    let output_path = match args.get(6) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(format!("자동전표_{}_{}", config.name(), today.format("%Y%m%d"))),
    };
    let csv_path = output_path.with_extension("csv");
    let xlsx_path = output_path.with_extension("xlsx");

    let conversion = convert_file(&args[1], &request, &mapping, template.as_ref(), &config, today)?;
    data::write_output(&conversion.output, &csv_path)?;
    data::write_output_xlsx(&conversion.output, &xlsx_path)?;

    let report = conversion.summary.to_string();
    fs::write(output_path.with_extension("txt"), &report)?;
    println!("{}", report);
    println!("output: {}, {}", csv_path.display(), xlsx_path.display());

    Ok(())
}
