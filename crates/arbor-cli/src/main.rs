//! Arbor CLI - inspect and exercise the permission engine.
//!
//! Reads the catalog and grant documents named in the configuration,
//! resolves effective permissions, answers access checks and mints or
//! verifies claim tokens.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use arbor_core::{OrganizationId, PrincipalId};
use arbor_telemetry::{RequestContext, RequestGuard};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

mod commands;
mod engine;
mod theme;

use commands::{check, claims, resolve, validate};
use engine::Engine;
use theme::Theme;

/// Arbor - effective permission resolution
#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to an additional configuration file
    #[arg(short, long, global = true, env = "ARBOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Who to resolve for, and when.
#[derive(Args, Debug, Clone)]
pub(crate) struct Subject {
    /// Principal id (UUID)
    #[arg(short, long)]
    pub(crate) principal: PrincipalId,

    /// Organization context (UUID); omit for platform-level resolution
    #[arg(short, long)]
    pub(crate) org: Option<OrganizationId>,

    /// Resolve as of this date (YYYY-MM-DD); defaults to today (UTC)
    #[arg(long)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a principal's effective permissions
    Resolve {
        #[command(flatten)]
        subject: Subject,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where each effective permission comes from
    Explain {
        #[command(flatten)]
        subject: Subject,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Check one permission at one scope (exit 0 allowed, 1 denied)
    Check {
        #[command(flatten)]
        subject: Subject,

        /// Permission name
        #[arg(long)]
        permission: String,

        /// Requested scope path
        #[arg(long)]
        scope: String,

        /// The session is elevated (MFA satisfied)
        #[arg(long)]
        elevated: bool,
    },

    /// Resolve and print a signed claim token
    Issue {
        /// Principal id (UUID)
        #[arg(short, long)]
        principal: PrincipalId,

        /// Organization context (UUID)
        #[arg(short, long)]
        org: Option<OrganizationId>,
    },

    /// Verify a claim token, optionally checking one permission
    Verify {
        /// The token
        #[arg(long)]
        token: String,

        /// Issuer public key (base64); defaults to the local signing key
        #[arg(long)]
        public_key: Option<String>,

        /// Permission to check
        #[arg(long, requires = "scope")]
        permission: Option<String>,

        /// Scope to check the permission at
        #[arg(long, requires = "permission")]
        scope: Option<String>,
    },

    /// Validate the catalog (non-zero exit on cycles)
    Validate,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "resolve",
            Self::Explain { .. } => "explain",
            Self::Check { .. } => "check",
            Self::Issue { .. } => "issue",
            Self::Verify { .. } => "verify",
            Self::Validate => "validate",
        }
    }

    fn principal(&self) -> Option<PrincipalId> {
        match self {
            Self::Resolve { subject, .. }
            | Self::Explain { subject, .. }
            | Self::Check { subject, .. } => Some(subject.principal),
            Self::Issue { principal, .. } => Some(*principal),
            Self::Verify { .. } | Self::Validate => None,
        }
    }

    fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::new("arbor-cli").with_operation(self.name());
        match self.principal() {
            Some(principal) => ctx.with_principal(principal),
            None => ctx,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let engine = Engine::load(cli.config.as_deref())?;
    match engine.log_config(cli.verbose) {
        Ok(log) => {
            if let Err(e) = arbor_telemetry::setup_logging(&log) {
                eprintln!("{}", Theme::warning(&format!("logging disabled: {e}")));
            }
        },
        Err(e) => eprintln!("{}", Theme::warning(&format!("logging disabled: {e}"))),
    }

    let _request = RequestGuard::new(cli.command.request_context());

    match cli.command {
        Commands::Resolve { subject, json } => resolve::run_resolve(&engine, &subject, json),
        Commands::Explain { subject, json } => resolve::run_explain(&engine, &subject, json),
        Commands::Check {
            subject,
            permission,
            scope,
            elevated,
        } => check::run_check(&engine, &subject, &permission, &scope, elevated),
        Commands::Issue { principal, org } => claims::run_issue(&engine, principal, org),
        Commands::Verify {
            token,
            public_key,
            permission,
            scope,
        } => claims::run_verify(
            &engine,
            &token,
            public_key.as_deref(),
            permission.as_deref().zip(scope.as_deref()),
        ),
        Commands::Validate => validate::run_validate(&engine),
    }
}
