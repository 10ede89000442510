//! `edgeport validate`: resolve and print the layered configuration.
//!
//! Runs the same resolution as `edgeport run` (defaults, file,
//! environment), then reports the result and every warning collected
//! along the way, as text or JSON.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::{self, env::ProcessEnv, validation};
use crate::error::EdgeError;

pub fn execute(args: &ValidateArgs) -> Result<(), EdgeError> {
    let loaded = config::load_app_config_with(&ProcessEnv, args.config.as_deref());

    let mut warnings = loaded.warnings.clone();
    warnings.extend(validation::check(&loaded.config));

    match args.format {
        ValidateFormat::Text => {
            println!("{}", validation::format_validation_report(&loaded));
            if warnings.is_empty() {
                println!("\n\u{2713} no warnings");
            } else {
                eprintln!("\n{} warning(s):", warnings.len());
                for warning in &warnings {
                    eprintln!("{warning}");
                }
            }
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_path": loaded.config_path,
                    "file_loaded": loaded.file_config_loaded,
                    "config": loaded.config,
                    "warnings": warnings,
                })
            );
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(EdgeError::StrictValidation(warnings.len()));
    }
    Ok(())
}
