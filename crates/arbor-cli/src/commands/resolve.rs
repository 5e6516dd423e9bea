//! `arbor resolve` and `arbor explain`.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::Result;
use arbor_core::EffectivePermissionSet;
use arbor_resolver::{Provenance, Resolution};

use crate::Subject;
use crate::engine::Engine;
use crate::theme::Theme;

pub(crate) fn run_resolve(engine: &Engine, subject: &Subject, json: bool) -> Result<ExitCode> {
    let set = engine
        .resolver()?
        .resolve_as_of(&subject.context(), subject.as_of())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
    } else {
        println!(
            "{}",
            Theme::header(&format!("Effective permissions as of {}", subject.as_of()))
        );
        print!("{}", render_set(&set));
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn run_explain(engine: &Engine, subject: &Subject, json: bool) -> Result<ExitCode> {
    let resolution = engine
        .resolver()?
        .explain_as_of(&subject.context(), subject.as_of())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!(
            "{}",
            Theme::header(&format!("Permission provenance as of {}", subject.as_of()))
        );
        print!("{}", render_resolution(&resolution));
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn render_set(set: &EffectivePermissionSet) -> String {
    if set.is_empty() {
        return format!("{}\n", Theme::dimmed("  (none)"));
    }
    let mut out = String::new();
    for entry in set {
        let mfa = if entry.requires_mfa { " [mfa]" } else { "" };
        let _ = writeln!(out, "  {:<32} {}{mfa}", entry.name.as_str(), entry.scope);
    }
    out
}

pub(crate) fn render_resolution(resolution: &Resolution) -> String {
    if resolution.permissions.is_empty() {
        return format!("{}\n", Theme::dimmed("  (none)"));
    }
    let mut out = String::new();
    for entry in &resolution.permissions {
        let _ = writeln!(out, "  {} @ {}", entry.name, entry.scope);

        let chain = resolution.chain(&entry.name);
        if let Some(Provenance::Implied { .. }) = resolution.provenance_of(&entry.name) {
            let names: Vec<&str> = chain.iter().map(|name| name.as_str()).collect();
            let _ = writeln!(out, "    {}", Theme::dimmed(&names.join(" <- ")));
        }
        if let Some(source) = chain.last().and_then(|root| resolution.provenance_of(root)) {
            let _ = writeln!(out, "    {}", Theme::dimmed(&source.to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::PrincipalId;
    use arbor_resolver::resolve_grants;
    use arbor_test::{GrantBuilder, sample_catalog};

    #[test]
    fn test_render_empty_set() {
        colored::control::set_override(false);
        assert_eq!(render_set(&EffectivePermissionSet::new()), "  (none)\n");
    }

    #[test]
    fn test_render_set_marks_mfa() {
        colored::control::set_override(false);
        let grant = GrantBuilder::new(PrincipalId::new(), "billing-admin")
            .at("root.acme")
            .build();
        let resolution = resolve_grants(&sample_catalog(), &[grant]);

        let rendered = render_set(&resolution.permissions);
        assert!(rendered.contains("billing.refund"));
        assert!(rendered.contains("root.acme [mfa]"));
        assert!(rendered.contains("billing.read"));
    }

    #[test]
    fn test_render_resolution_shows_chain() {
        colored::control::set_override(false);
        let grant = GrantBuilder::new(PrincipalId::new(), "org-admin")
            .at("root.acme")
            .build();
        let resolution = resolve_grants(&sample_catalog(), &[grant]);

        let rendered = render_resolution(&resolution);
        assert!(rendered.contains("organization.view @ root.acme"));
        assert!(rendered.contains("organization.view <- organization.update"));
        assert!(rendered.contains("granted by role:"));
    }
}
