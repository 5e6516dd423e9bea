//! `arbor validate`.

use std::process::ExitCode;

use anyhow::Result;
use arbor_catalog::ValidationIssue;

use crate::engine::Engine;
use crate::theme::Theme;

pub(crate) fn run_validate(engine: &Engine) -> Result<ExitCode> {
    let catalog = engine.catalog()?;
    let issues = catalog.validate();

    println!("{}", Theme::header("Catalog"));
    println!("  Permissions:  {}", catalog.permissions().count());
    println!("  Roles:        {}", catalog.roles().count());
    println!("  Implications: {}", catalog.graph().edge_count());
    println!("  Fingerprint:  {}", catalog.fingerprint());
    println!("{}", Theme::separator());

    if issues.is_empty() {
        println!("{}", Theme::success("no issues found"));
    }
    for issue in &issues {
        if issue.is_error() {
            println!("{}", Theme::error(&issue.to_string()));
        } else {
            println!("{}", Theme::info(&issue.to_string()));
        }
    }

    Ok(exit_code(&issues))
}

/// Failure if any issue is an error. Informational issues pass.
fn exit_code(issues: &[ValidationIssue]) -> ExitCode {
    if has_errors(issues) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_error)
}
