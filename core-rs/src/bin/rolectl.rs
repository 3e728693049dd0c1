//! rolectl - Role Manager CLI
//!
//! Command-line front for the role registry, backed by a JSON file store.
//! The CLI runs as a trusted local operator.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

use role_manager::config::DEFAULT_CONFIG_FILE;
use role_manager::{
    CapabilityCatalog, FileStore, ImportMode, LocalOperator, RegistryConfig, Role, RoleAdmin,
    RoleRegistry,
};

#[derive(Parser)]
#[command(name = "rolectl")]
#[command(version)]
#[command(about = "Manage roles and capabilities", long_about = None)]
struct Cli {
    /// Path to rolectl.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Role store file (overrides spec.store from the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all roles
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one role and its capabilities
    Show {
        /// Role key
        key: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new role with no capabilities
    Create {
        /// Role name (the key is derived from it)
        name: String,
        /// Description, used as the display name
        #[arg(long, short, default_value = "")]
        description: String,
    },
    /// Change a role's display name (the key never changes)
    Rename {
        /// Role key
        key: String,
        /// New display name
        name: String,
    },
    /// Manage a role's capabilities
    Caps {
        #[command(subcommand)]
        command: CapsCommands,
    },
    /// Delete a role
    Delete {
        /// Role key
        key: String,
    },
    /// Export all roles as JSON
    Export {
        /// Write to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import roles from a JSON export
    Import {
        /// Exported roles file
        file: PathBuf,
        /// Apply valid entries even if others fail
        #[arg(long)]
        best_effort: bool,
    },
    /// Show the capability catalog
    Catalog,
}

#[derive(Subcommand)]
enum CapsCommands {
    /// Replace the role's capabilities with exactly this set
    Set {
        /// Role key
        key: String,
        /// Capabilities to grant (everything else is revoked)
        capabilities: Vec<String>,
    },
    /// Grant one capability
    Grant {
        key: String,
        capability: String,
    },
    /// Revoke one capability
    Revoke {
        key: String,
        capability: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve config and store path from flags
fn load_config(cli: &Cli) -> anyhow::Result<(RegistryConfig, PathBuf)> {
    let (config, base_dir) = match &cli.config {
        Some(path) => {
            let config = RegistryConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (config, base)
        }
        None => (RegistryConfig::load_or_default(DEFAULT_CONFIG_FILE)?, PathBuf::new()),
    };

    let store_path = match &cli.store {
        Some(path) => path.clone(),
        None if config.spec.store.is_relative() => base_dir.join(&config.spec.store),
        None => config.spec.store.clone(),
    };

    debug!(store = %store_path.display(), "resolved role store");
    Ok((config, store_path))
}

fn print_role(role: &Role, catalog: &CapabilityCatalog) {
    println!("\nRole: {}", role.display_name());
    println!("  Key:          {}", role.key());
    if role.capabilities().is_empty() {
        println!("  Capabilities: (none)\n");
        return;
    }
    println!("  Capabilities:");
    for cap in role.capabilities() {
        match catalog.category_of(cap) {
            Some(category) => println!("    - {:<20} ({})", cap, category),
            None => println!("    - {}", cap),
        }
    }
    println!();
}

/// Handle `rolectl list`
fn handle_list(admin: &RoleAdmin<'_, FileStore, LocalOperator>, json: bool) -> anyhow::Result<()> {
    let roles = admin.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    if roles.is_empty() {
        println!("No roles defined.");
        println!("\nRun `rolectl create <name>` to add one.");
        return Ok(());
    }

    println!("{:<24} {:<32} {}", "KEY", "NAME", "CAPABILITIES");
    for role in &roles {
        println!(
            "{:<24} {:<32} {}",
            role.key(),
            role.display_name(),
            role.capabilities().len()
        );
    }
    println!("\nTotal: {} role(s)", roles.len());
    Ok(())
}

/// Handle `rolectl caps ...`
fn handle_caps(
    admin: &RoleAdmin<'_, FileStore, LocalOperator>,
    command: CapsCommands,
) -> anyhow::Result<()> {
    match command {
        CapsCommands::Set { key, capabilities } => {
            let update = admin.set_capabilities(&key, &capabilities)?;
            for cap in &update.dropped {
                eprintln!("{} ignored unknown capability \"{}\"", "!".yellow(), cap);
            }
            println!(
                "{} Role \"{}\" now has {} capability(ies)",
                "✓".green(),
                key,
                update.role.capabilities().len()
            );
        }
        CapsCommands::Grant { key, capability } => {
            if admin.grant(&key, &capability)? {
                println!("{} Granted {} to \"{}\"", "✓".green(), capability, key);
            } else if admin.catalog()?.contains(&capability) {
                println!("Role \"{}\" already has {}", key, capability);
            } else {
                eprintln!("{} ignored unknown capability \"{}\"", "!".yellow(), capability);
            }
        }
        CapsCommands::Revoke { key, capability } => {
            if admin.revoke(&key, &capability)? {
                println!("{} Revoked {} from \"{}\"", "✓".green(), capability, key);
            } else {
                println!("Role \"{}\" did not have {}", key, capability);
            }
        }
    }
    Ok(())
}

/// Handle `rolectl import <file>`
fn handle_import(
    admin: &RoleAdmin<'_, FileStore, LocalOperator>,
    file: &Path,
    mode: ImportMode,
) -> anyhow::Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = admin.import_json(&json, mode)?;

    for warning in &report.warnings {
        eprintln!(
            "{} {}: ignored unknown capability \"{}\"",
            "!".yellow(),
            warning.key,
            warning.capability
        );
    }
    for key in &report.ignored {
        eprintln!("{} ignored top-level key \"{}\" (not a role key)", "!".yellow(), key);
    }
    for error in &report.errors {
        eprintln!("{} {}: {}", "✗".red(), error.key, error.reason);
    }

    if !report.committed {
        if report.has_errors() {
            bail!(
                "Import failed: {} invalid entr(y/ies), no roles were changed",
                report.errors.len()
            );
        }
        println!("No roles to import.");
        return Ok(());
    }

    println!(
        "{} Imported roles: {} created, {} overwritten",
        "✓".green(),
        report.created_count(),
        report.overwritten_count()
    );

    if report.has_errors() {
        bail!("{} entr(y/ies) failed to import", report.errors.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, store_path) = load_config(&cli)?;
    let registry = RoleRegistry::with_catalog(FileStore::new(store_path), config.catalog());
    let admin = RoleAdmin::new(&registry, LocalOperator).with_limits(config.spec.import.limits);

    match cli.command {
        Commands::List { json } => handle_list(&admin, json)?,

        Commands::Show { key, json } => {
            let role = admin.get(&key)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&role)?);
            } else {
                print_role(&role, admin.catalog()?);
            }
        }

        Commands::Create { name, description } => {
            let role = admin.create(&name, &description)?;
            println!("{} Role created", "✓".green());
            println!("  Key:  {}", role.key());
            println!("  Name: {}", role.display_name());
        }

        Commands::Rename { key, name } => {
            admin.rename(&key, &name)?;
            println!("{} Role \"{}\" renamed to \"{}\"", "✓".green(), key, name.trim());
        }

        Commands::Caps { command } => handle_caps(&admin, command)?,

        Commands::Delete { key } => {
            admin.delete(&key)?;
            println!("{} Role \"{}\" deleted", "✓".green(), key);
        }

        Commands::Export { output } => {
            let json = admin.export_json()?;
            match output {
                Some(path) => {
                    fs::write(&path, &json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{} Exported roles to {}", "✓".green(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Import { file, best_effort } => {
            let mode = if best_effort {
                ImportMode::BestEffort
            } else {
                config.spec.import.mode
            };
            handle_import(&admin, &file, mode)?;
        }

        Commands::Catalog => {
            for category in admin.catalog()?.categories() {
                println!("{}", category.name.bold());
                for cap in &category.capabilities {
                    println!("  {}", cap);
                }
            }
        }
    }

    Ok(())
}
