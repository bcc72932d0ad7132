use std::path::Path;
use std::sync::Arc;

use crate::{emit_error, emit_success, OutputMode};
use owo_colors::OwoColorize;
use partscope::catalog::{Catalog, ScopedCatalog};
use partscope::config::{write_config, PartscopeConfig};
use partscope::ui::{self, export_table, section, stats_table, success, summary_row, ExportRow, Icons};
use partscope::{Container, Error, ScopeName};

fn load_catalog(manifest: &Path) -> anyhow::Result<Arc<Catalog>> {
    Ok(Arc::new(Catalog::load(manifest)?))
}

fn parse_scope(scope: &str) -> anyhow::Result<ScopeName> {
    Ok(ScopeName::new(scope)?)
}

pub fn run_resolve(output_mode: OutputMode, manifest: &Path, scope: &str, all: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(manifest)?;
    let scoped = catalog.scoped(&parse_scope(scope)?);

    let keys: Vec<_> = if all {
        catalog.exports().map(|(key, _)| key).collect()
    } else {
        scoped.exports().map(|(key, _)| key).collect()
    };

    if output_mode.is_human() {
        ui::header(&format!("Scope '{}' ({})", scope, manifest.display()));
        let rows: Vec<ExportRow> = keys.iter().map(|key| export_row(&scoped, *key)).collect();
        if rows.is_empty() {
            println!("∅ No exports visible in scope '{}'.", scope);
        } else {
            println!("{}", export_table(&rows));
        }
        summary_row(
            "Visible:",
            &format!("{} of {} exports", scoped.export_count(), catalog.export_count()),
        );
    } else {
        let exports: Vec<_> = keys
            .iter()
            .map(|key| {
                let export = catalog.export(*key);
                serde_json::json!({
                    "contract": export.contract,
                    "target": catalog.target_name(export.target),
                    "resolution": scoped.explain(*key),
                })
            })
            .collect();
        emit_success(output_mode, "resolve", serde_json::json!({
            "scope": scope,
            "visible": scoped.export_count(),
            "total": catalog.export_count(),
            "exports": exports,
        }))?;
    }
    Ok(())
}

fn export_row(scoped: &ScopedCatalog, key: partscope::catalog::ExportKey) -> ExportRow {
    let catalog = scoped.base();
    let export = catalog.export(key);
    let resolution = scoped.explain(key);
    ExportRow {
        contract: export.contract.clone(),
        target: catalog.target_name(export.target),
        group: resolution
            .group
            .map(|g| g.to_string())
            .unwrap_or_else(|| ui::dim("none")),
        verdict: ui::verdict(resolution.decision),
    }
}

pub fn run_explain(output_mode: OutputMode, manifest: &Path, scope: &str, contract: &str) -> anyhow::Result<()> {
    let catalog = load_catalog(manifest)?;
    let scoped = catalog.scoped(&parse_scope(scope)?);
    let keys: Vec<_> = catalog.exports_for(contract).map(|(key, _)| key).collect();

    if keys.is_empty() {
        anyhow::bail!("no export with contract '{}' in {}", contract, manifest.display());
    }

    if output_mode.is_human() {
        ui::header(&format!("Explaining '{}' in scope '{}'", contract, scope));
        for key in keys {
            let export = catalog.export(key);
            let resolution = scoped.explain(key);
            section(&catalog.target_name(export.target));
            summary_row("Verdict:", &ui::verdict(resolution.decision));
            match resolution.group {
                Some(group) => summary_row(
                    "Decided by:",
                    &format!("{} declarations ({} vote(s))", group, resolution.votes),
                ),
                None => summary_row("Decided by:", &ui::dim("no declarations, excluded by default")),
            }
        }
    } else {
        let explained: Vec<_> = keys
            .into_iter()
            .map(|key| {
                serde_json::json!({
                    "target": catalog.target_name(catalog.export(key).target),
                    "resolution": scoped.explain(key),
                })
            })
            .collect();
        emit_success(output_mode, "explain", serde_json::json!({
            "scope": scope,
            "contract": contract,
            "exports": explained,
        }))?;
    }
    Ok(())
}

pub fn run_check(output_mode: OutputMode, manifest: &Path) -> anyhow::Result<()> {
    match Catalog::load(manifest) {
        Ok(catalog) => {
            if output_mode.is_human() {
                success(&format!("{} is valid", manifest.display()));
                println!("{}", stats_table(&catalog.stats()));
            } else {
                emit_success(output_mode, "check", serde_json::json!({
                    "valid": true,
                    "stats": catalog.stats(),
                }))?;
            }
            Ok(())
        }
        Err(Error::Manifest(problems)) => {
            if output_mode.is_human() {
                for problem in problems.iter() {
                    ui::error(problem);
                }
            } else {
                emit_error(output_mode, "check", serde_json::json!({
                    "valid": false,
                    "problems": problems.iter().collect::<Vec<_>>(),
                }))?;
            }
            anyhow::bail!("{} problem(s) in {}", problems.len(), manifest.display())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run_scopes(output_mode: OutputMode, manifest: &Path) -> anyhow::Result<()> {
    let catalog = load_catalog(manifest)?;
    let names = catalog.scope_names();

    if output_mode.is_human() {
        ui::header(&format!("Scopes declared in {}", manifest.display()));
        if names.is_empty() {
            println!("∅ No scopes declared.");
        }
        for name in &names {
            let visible = catalog.scoped(name).export_count();
            println!("  {} {} {}", Icons::PACKAGE, name.bold(), ui::dim(&format!("({} exports)", visible)));
        }
    } else {
        emit_success(output_mode, "scopes", serde_json::json!({ "scopes": names }))?;
    }
    Ok(())
}

pub fn run_stats(output_mode: OutputMode, manifest: &Path) -> anyhow::Result<()> {
    let catalog = load_catalog(manifest)?;
    let stats = catalog.stats();

    if output_mode.is_human() {
        println!("{} Catalog Statistics ({})", Icons::STATS, manifest.display());
        println!("{}", stats_table(&stats));
    } else {
        emit_success(output_mode, "stats", serde_json::to_value(&stats)?)?;
    }
    Ok(())
}

pub fn run_lookup(
    output_mode: OutputMode,
    manifest: &Path,
    scope: &str,
    contracts: &[String],
    inherit: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(manifest)?;
    let root = Container::new(catalog);
    let child = root.child(&parse_scope(scope)?, inherit);

    match child.get_exports(contracts.iter().map(String::as_str)) {
        Ok(exports) => {
            if output_mode.is_human() {
                ui::header(&format!("Lookup in {}", child.describe()));
                for export in &exports {
                    let origin = match &export.provider {
                        Some(provider) => format!("scope '{}'", provider),
                        None => format!("{} parent", Icons::PARENT),
                    };
                    println!("  {} → {} {}", export.contract.bold(), export.target, ui::dim(&origin));
                }
            } else {
                emit_success(output_mode, "lookup", serde_json::json!({
                    "scope": scope,
                    "inherit": inherit,
                    "exports": exports,
                }))?;
            }
            Ok(())
        }
        Err(Error::Composition(problems)) => {
            if output_mode.is_human() {
                for problem in problems.iter() {
                    ui::error(problem);
                }
            } else {
                emit_error(output_mode, "lookup", serde_json::json!({
                    "scope": scope,
                    "inherit": inherit,
                    "problems": problems.iter().collect::<Vec<_>>(),
                }))?;
            }
            anyhow::bail!("{} contract(s) could not be resolved", problems.len())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run_init(
    output_mode: OutputMode,
    path: &Path,
    force: bool,
    manifest: Option<String>,
    default_scope: Option<String>,
) -> anyhow::Result<()> {
    if let Some(scope) = &default_scope {
        parse_scope(scope)?;
    }
    let config = PartscopeConfig {
        manifest,
        default_scope,
    };
    write_config(path, &config, force)?;

    if output_mode.is_human() {
        success(&format!("Wrote {}", path.display()));
    } else {
        emit_success(output_mode, "init", serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        }))?;
    }
    Ok(())
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        println!(
            "{} {}",
            "Partscope".bold().style(ui::theme().info.clone()),
            format!("Version {}", env!("CARGO_PKG_VERSION")).bold()
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}
