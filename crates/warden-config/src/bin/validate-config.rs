//! Config validation CLI tool
//!
//! Validates the session-warden configuration exactly as the function would
//! see it at cold start and reports any errors.

use std::process::ExitCode;
use warden_config::{ConfigError, ENV_CONFIG_FILE};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: validate-config [config-file]");
        eprintln!();
        eprintln!("Validates the session-warden configuration from the environment.");
        eprintln!("If a TOML file is given it is used as the base layer, as if");
        eprintln!("{} pointed at it.", ENV_CONFIG_FILE);
        return ExitCode::from(2);
    }

    let file_override = args.get(1).cloned();
    let result = warden_config::load_config_with(|key| {
        if key == ENV_CONFIG_FILE && file_override.is_some() {
            return file_override.clone();
        }
        std::env::var(key).ok()
    });

    match result {
        Ok(policy) => {
            let limits = &policy.limits;
            println!("✓ Configuration is valid");
            println!();
            println!("Limits:");
            println!("  Max workers:        {}", limits.max_workers);
            println!("  Max idle timeout:   {} min", limits.max_idle_timeout_minutes());
            println!("  Enforce VPC:        {}", limits.enforce_vpc);
            println!("  Require owner:      {}", limits.require_owner);
            println!();
            println!("Enforcement:");
            println!("  Terminate sessions: {}", limits.kill_on_violation);
            match &limits.notification_target {
                Some(target) => println!("  Notify:             {}", target),
                None => println!("  Notify:             disabled"),
            }
            println!();
            println!("Service defaults:");
            match policy.defaults.workers {
                Some(w) => println!("  Workers:            {}", w),
                None => println!("  Workers:            unknown (treated as compliant)"),
            }
            match policy.defaults.idle_timeout {
                Some(t) => println!("  Idle timeout:       {} min", t.as_secs() / 60),
                None => println!("  Idle timeout:       unknown (treated as compliant)"),
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            ExitCode::from(1)
        }
    }
}
