use anyhow::{Context, Result};
use sangeet_backend::{config, Config};

const VALID_KEYS: &str = "storage_dir, credentials_path, backend.project_id";

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  storage_dir: {}", config.storage_dir.display());
    println!("  credentials_path: {}", config.credentials_path.display());
    println!("  backend.project_id: {}", or_unset(&config.backend.project_id));
    println!("  backend.auth_domain: {}", or_unset(&config.backend.auth_domain));
    println!("  backend.storage_bucket: {}", or_unset(&config.backend.storage_bucket));
    println!("  backend.auth_url: {}", config.backend.auth_url);
    println!("  backend.database_url: {}", config.backend.database_url);

    println!("\nPriority: CLI args > ENV vars (SANGEET_*) > Config file > Defaults");

    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "<not set>"
    } else {
        value
    }
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;

        match key.as_str() {
            "storage_dir" => println!("{}", config.storage_dir.display()),
            "credentials_path" => println!("{}", config.credentials_path.display()),
            "backend.project_id" => println!("{}", or_unset(&config.backend.project_id)),
            _ => {
                anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, VALID_KEYS);
            }
        }
    } else {
        // No key provided, show the effective configuration as TOML
        let config = Config::load()?;
        print!("{}", config.to_toml()?);
    }

    Ok(())
}

/// Set a config value.
pub fn set_config(key: String, value: String) -> Result<()> {
    let config_path = config::config_file_path();

    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path)
        .context("Failed to read config file")?;

    let updated = match key.as_str() {
        "storage_dir" | "credentials_path" => set_top_level(&contents, &key, &value),
        "backend.project_id" => set_in_table(&contents, "backend", "project_id", &value),
        _ => {
            anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, VALID_KEYS);
        }
    };

    std::fs::write(&config_path, updated)
        .context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

fn is_assignment(line: &str, name: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix(name)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Replace (or insert) a top-level `name = "value"` line.
///
/// New keys go before the first table header so they stay top-level.
fn set_top_level(contents: &str, name: &str, value: &str) -> String {
    let assignment = format!("{} = {:?}", name, value);
    let mut lines: Vec<String> = Vec::new();
    let mut found = false;
    let mut in_table = false;

    for line in contents.lines() {
        if line.trim_start().starts_with('[') {
            if !found {
                lines.push(assignment.clone());
                lines.push(String::new());
                found = true;
            }
            in_table = true;
        }

        if !in_table && !found && is_assignment(line, name) {
            lines.push(assignment.clone());
            found = true;
        } else {
            lines.push(line.to_string());
        }
    }

    if !found {
        lines.push(assignment);
    }

    lines.join("\n") + "\n"
}

/// Replace (or insert) `name = "value"` inside `[table]`.
fn set_in_table(contents: &str, table: &str, name: &str, value: &str) -> String {
    let header = format!("[{}]", table);
    let assignment = format!("{} = {:?}", name, value);
    let mut lines: Vec<String> = Vec::new();
    let mut in_target = false;
    let mut found = false;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if in_target && !found {
                lines.push(assignment.clone());
                found = true;
            }
            in_target = trimmed == header;
        }

        if in_target && !found && is_assignment(line, name) {
            lines.push(assignment.clone());
            found = true;
        } else {
            lines.push(line.to_string());
        }
    }

    if !found {
        if !in_target {
            lines.push(String::new());
            lines.push(header);
        }
        lines.push(assignment);
    }

    lines.join("\n") + "\n"
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", sangeet_backend::config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = sangeet_backend::config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure sangeet.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
