//! cbac: inspect capability and tag access rule sets.
//!
//! Every subcommand except `registry` loads a TOML rule-set document and
//! answers questions about the users and groups it defines.
//!
//! Usage:
//!   cbac registry
//!   cbac --rules policies/example.toml validate
//!   cbac --rules policies/example.toml check --user alice --cap Download
//!   cbac --rules policies/example.toml caps --user alice
//!   cbac --rules policies/example.toml tags --user alice syslog winlog netflow
//!   cbac --rules policies/example.toml conflicts --group analysts --group ingest

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cbac_contracts::{registry, Capability, CbacError, CbacResult};
use cbac_policy::{
    compare_rules, explain_capability, AccessCheck, CapabilityGrant, PrincipalStore,
    RuleSetEngine,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Capability and tag access-control inspector.
#[derive(Parser)]
#[command(
    name = "cbac",
    about = "Inspect capability and tag access rule sets",
    long_about = "Resolves capability and tag decisions for users defined in a TOML\n\
                  rule set, combining each user's own grants with its groups' grants."
)]
struct Cli {
    /// TOML rule-set document.
    #[arg(long, short, global = true, default_value = "policies/example.toml")]
    rules: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every known capability with its category.
    Registry,
    /// Load and validate the rule set.
    Validate,
    /// Decide a single capability for a user.
    Check {
        #[arg(long)]
        user: String,
        #[arg(long)]
        cap: String,
    },
    /// List every capability a user holds.
    Caps {
        #[arg(long)]
        user: String,
    },
    /// Print the tags a user may see, in the order given.
    Tags {
        #[arg(long)]
        user: String,
        tags: Vec<String>,
    },
    /// Compare the rules of two groups.
    Conflicts {
        /// Group name; give exactly two.
        #[arg(long = "group", required = true)]
        groups: Vec<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to see every decision.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Registry => run_registry(),
        Command::Validate => run_validate(&cli.rules),
        Command::Check { user, cap } => run_check(&cli.rules, &user, &cap),
        Command::Caps { user } => run_caps(&cli.rules, &user),
        Command::Tags { user, tags } => run_tags(&cli.rules, &user, &tags),
        Command::Conflicts { groups } => run_conflicts(&cli.rules, &groups),
    };

    if let Err(e) = result {
        eprintln!("cbac: {}", e);
        std::process::exit(1);
    }
}

fn load(path: &Path) -> CbacResult<RuleSetEngine> {
    debug!(path = %path.display(), "loading rule set");
    RuleSetEngine::from_file(path)
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_registry() -> CbacResult<()> {
    for d in registry().descriptors() {
        println!("{:>3}  {:<20} {:<20} {}", d.cap.0, d.name, d.category, d.description);
    }
    println!();
    for t in registry().templates() {
        println!("template {:<12} {} capabilities: {}", t.name, t.caps.len(), t.description);
    }
    Ok(())
}

fn run_validate(path: &Path) -> CbacResult<()> {
    let engine = load(path)?;
    println!(
        "{}: ok ({} groups, {} users)",
        path.display(),
        engine.groups().len(),
        engine.users().len()
    );
    Ok(())
}

fn run_check(path: &Path, username: &str, cap: &str) -> CbacResult<()> {
    let engine = load(path)?;
    let user = engine.load_user(username)?;
    let cap = Capability::parse(cap)?;

    let verdict = match explain_capability(&user, cap) {
        CapabilityGrant::Admin => "ALLOW (admin)".to_string(),
        CapabilityGrant::User => "ALLOW (user grant)".to_string(),
        CapabilityGrant::Group(g) => format!("ALLOW (group '{}')", g),
        CapabilityGrant::Denied => "DENY".to_string(),
    };
    println!("{} {}: {}", username, cap, verdict);
    Ok(())
}

fn run_caps(path: &Path, username: &str) -> CbacResult<()> {
    let engine = load(path)?;
    let user = engine.load_user(username)?;
    for d in user.capability_list() {
        println!("{:<20} {}", d.name, d.category);
    }
    Ok(())
}

fn run_tags(path: &Path, username: &str, tags: &[String]) -> CbacResult<()> {
    let engine = load(path)?;
    let user = engine.load_user(username)?;
    for tag in user.filter_tags(tags) {
        println!("{}", tag);
    }
    Ok(())
}

fn run_conflicts(path: &Path, groups: &[String]) -> CbacResult<()> {
    let [a, b] = groups else {
        return Err(CbacError::Config {
            reason: "exactly two --group arguments are required".to_string(),
        });
    };
    let engine = load(path)?;
    let ga = engine.load_group(a)?;
    let gb = engine.load_group(b)?;

    let diff = compare_rules(&ga.rules, &gb.rules);
    if diff.is_empty() {
        println!("groups '{}' and '{}' grant the same access", a, b);
        return Ok(());
    }
    for c in &diff.capabilities {
        let holder = if ga.rules.capabilities.has(*c) { a } else { b };
        println!("capability {:<20} only granted by '{}'", c, holder);
    }
    if let Some(tag) = diff.tag {
        println!("tag grant  {:<20} not covered by both groups", tag);
    }
    Ok(())
}
