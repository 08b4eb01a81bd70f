//! Config subcommand handlers.

use std::fmt::Write as _;

use meshprov_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "fail_fast = {}", cfg.defaults.fail_fast);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "controller = \"{}\"", p.controller);
        if !p.config_path.is_empty() {
            let _ = writeln!(out, "config_path = \"{}\"", p.config_path);
        }
        if !p.group_base.is_empty() {
            let _ = writeln!(out, "group_base = \"{}\"", p.group_base);
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let rendered = match global.output {
                OutputFormat::Json => {
                    let mut redacted = serde_json::to_value(&cfg)?;
                    if let Some(profiles) = redacted
                        .get_mut("profiles")
                        .and_then(serde_json::Value::as_object_mut)
                    {
                        for profile in profiles.values_mut() {
                            if let Some(pw) = profile.get_mut("password").filter(|v| !v.is_null()) {
                                *pw = "****".into();
                            }
                        }
                    }
                    output::render_json(&redacted)?
                }
                OutputFormat::Table | OutputFormat::Plain => format_config_redacted(&cfg),
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_file(global).display());
            Ok(())
        }

        ConfigCommand::Use { ref name } => {
            let mut cfg = config::load(global)?;
            cfg.profile(name)?;

            cfg.default_profile = Some(name.clone());
            let path = meshprov_config::save_config(&cfg, Some(&config::config_file(global)))?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}' in {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::SetPassword { ref profile } => {
            let cfg = config::load(global)?;
            let name = cfg.active_profile_name(profile.as_deref().or(global.profile.as_deref()));

            let password = rpassword::prompt_password(format!("Password for profile '{name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            meshprov_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password for profile '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}
