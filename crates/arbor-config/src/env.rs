//! `ARBOR_*` environment overrides.
//!
//! Environment variables are the last layer: a set variable replaces
//! whatever the files configured for its field.

use std::collections::HashMap;

use tracing::debug;

/// Prefix shared by every Arbor environment variable.
pub const ENV_PREFIX: &str = "ARBOR_";

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: FieldKind,
}

#[derive(Clone, Copy)]
enum FieldKind {
    String,
    Integer,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "ARBOR_LOG_LEVEL",
        field_path: "logging.level",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_LOG_FORMAT",
        field_path: "logging.format",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_LOG_TARGET",
        field_path: "logging.target",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_LOG_DIR",
        field_path: "logging.directory",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_CATALOG",
        field_path: "catalog.path",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_GRANTS",
        field_path: "grants.path",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_CLAIMS_ISSUER",
        field_path: "claims.issuer",
        kind: FieldKind::String,
    },
    EnvMapping {
        var_name: "ARBOR_CLAIMS_TTL_SECS",
        field_path: "claims.ttl_secs",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "ARBOR_CLAIMS_LEEWAY_SECS",
        field_path: "claims.leeway_secs",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "ARBOR_CLAIMS_KEY",
        field_path: "claims.key_path",
        kind: FieldKind::String,
    },
];

/// Snapshot the process environment, keeping only `ARBOR_*` variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Apply environment overrides to the merged tree.
///
/// Returns the number of variables applied.
pub(crate) fn apply_env_overrides<S: std::hash::BuildHasher>(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var override"
        );
        set_field(merged, mapping.field_path, coerce(mapping.kind, raw));
        count = count.saturating_add(1);
    }

    count
}

/// Convert a raw variable to a TOML value.
///
/// A non-numeric value for an integer field stays a string so that
/// deserialization reports it against the field.
fn coerce(kind: FieldKind, raw: &str) -> toml::Value {
    match kind {
        FieldKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map_or_else(|_| toml::Value::String(raw.to_owned()), toml::Value::Integer),
        FieldKind::String => toml::Value::String(raw.to_owned()),
    }
}

/// Set `section.key` in the tree, creating the section if needed.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let Some((section, key)) = path.split_once('.') else {
        return;
    };
    let Some(table) = root.as_table_mut() else {
        return;
    };
    let section = table
        .entry(section.to_owned())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    if let Some(section) = section.as_table_mut() {
        section.insert(key.to_owned(), value);
    }
}
