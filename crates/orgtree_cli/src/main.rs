//! Prints every organization's sector tree as JSON.
//!
//! Usage: `orgtree [CONFIG.toml]`. Without a config file the defaults apply,
//! which means an empty in-memory database and no file logging.

use log::info;
use orgtree_core::{init_from_config, CoreConfig, OrgTreeService};
use serde_json::{json, Value};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("orgtree: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_from_config(&config.logging)?;

    let conn = config.database.open()?;
    let service = OrgTreeService::try_from_connection(&conn)?;
    let tenant_id = config.tenant.default_id;

    let mut trees = Vec::new();
    for organization in service.list_organizations(tenant_id)? {
        let tree = match service.sector_tree(tenant_id, &organization.code) {
            Ok(tree) => serde_json::to_value(&tree)?,
            Err(err) => json!({ "error": err.code() }),
        };
        trees.push(json!({
            "code": organization.code,
            "label": organization.label,
            "type": organization.kind,
            "tree": tree,
        }));
    }

    info!(
        "event=cli_dump module=cli status=ok tenant_id={} organizations={}",
        tenant_id,
        trees.len()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&Value::Array(trees))?
    );
    Ok(())
}
