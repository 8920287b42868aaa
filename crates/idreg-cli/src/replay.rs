//! # Replay Subcommand
//!
//! Executes a scripted sequence of registry calls against a fresh registry
//! and reports each outcome. A script is a YAML (or JSON) list of steps;
//! each step names an `op`, its arguments, and optionally what it should
//! produce:
//!
//! ```yaml
//! - op: bind
//!   caller: ST1USER
//!   identity_hash: "0xabc"
//!   issued_by: ST1ISSUER
//!   recovery_guardians: [ST1GUARD]
//! - op: recover
//!   caller: ST1MALLORY
//!   lost: ST1USER
//!   new_principal: ST1NEW
//!   expect: 103
//! - op: get_hash
//!   principal: ST1USER
//!   expect: ok
//! ```
//!
//! `expect` accepts `ok`, a numeric code, or a code name such as
//! `ERR-NOT-GUARDIAN`. The command exits with status 2 when any
//! expectation is not met.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use idreg_core::{BlockHeight, IdentityHash, Principal, GENESIS_ADMIN};
use idreg_state::{describe, LedgerHeight, Registry, ERROR_CODES};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::OutputFormat;

/// Exit status when at least one step's expectation fails.
pub const EXIT_EXPECTATION_FAILED: u8 = 2;

/// Arguments for the `idreg replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to a YAML or JSON call script.
    pub script: PathBuf,

    /// Genesis administrator of the fresh registry.
    #[arg(long, default_value = GENESIS_ADMIN)]
    pub genesis_admin: String,

    /// Ledger height the first transaction executes at. Must be below
    /// `u64::MAX`, where heights stop advancing.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(..u64::MAX))]
    pub height: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

// ── Script model ────────────────────────────────────────────────────────────

/// One registry call. Keys a call does not take are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Call {
    Bind {
        caller: Principal,
        identity_hash: IdentityHash,
        issued_by: Principal,
        #[serde(default)]
        recovery_guardians: Vec<Principal>,
    },
    IsBound {
        principal: Principal,
    },
    GetHash {
        principal: Principal,
    },
    GetRecord {
        principal: Principal,
    },
    Revoke {
        caller: Principal,
        principal: Principal,
    },
    Recover {
        caller: Principal,
        lost: Principal,
        new_principal: Principal,
    },
    TransferAdmin {
        caller: Principal,
        new_admin: Principal,
    },
    /// Move the ledger height forward. Not a registry transaction.
    AdvanceHeight {
        height: u64,
    },
}

impl Call {
    /// The script name of this call.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "bind",
            Self::IsBound { .. } => "is_bound",
            Self::GetHash { .. } => "get_hash",
            Self::GetRecord { .. } => "get_record",
            Self::Revoke { .. } => "revoke",
            Self::Recover { .. } => "recover",
            Self::TransferAdmin { .. } => "transfer_admin",
            Self::AdvanceHeight { .. } => "advance_height",
        }
    }
}

/// What a step is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ExpectRepr")]
pub enum Expect {
    Success,
    Code(u16),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpectRepr {
    Code(u16),
    Word(String),
}

impl TryFrom<ExpectRepr> for Expect {
    type Error = String;

    fn try_from(repr: ExpectRepr) -> Result<Self, Self::Error> {
        match repr {
            ExpectRepr::Code(code) => describe(code)
                .map(|_| Self::Code(code))
                .ok_or_else(|| format!("unknown registry error code {code}")),
            ExpectRepr::Word(word) if word.eq_ignore_ascii_case("ok") => Ok(Self::Success),
            ExpectRepr::Word(word) => ERROR_CODES
                .iter()
                .find(|c| c.name == word)
                .map(|c| Self::Code(c.code))
                .ok_or_else(|| format!("expect must be ok, a code, or a code name; got {word:?}")),
        }
    }
}

impl Serialize for Expect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success => serializer.serialize_str("ok"),
            Self::Code(code) => serializer.serialize_u16(*code),
        }
    }
}

/// One script step: a call plus an optional `expect` key in the same map.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Mapping")]
pub struct Step {
    pub call: Call,
    pub expect: Option<Expect>,
}

impl TryFrom<Mapping> for Step {
    type Error = serde_yaml::Error;

    // Not `#[serde(flatten)]`: flattening disables `deny_unknown_fields`.
    fn try_from(mut map: Mapping) -> Result<Self, Self::Error> {
        let expect = map
            .remove("expect")
            .map(serde_yaml::from_value)
            .transpose()?;
        let call = serde_yaml::from_value(YamlValue::Mapping(map))?;
        Ok(Self { call, expect })
    }
}

// ── Outcomes ────────────────────────────────────────────────────────────────

/// Result of executing one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    Error {
        code: u16,
        name: &'static str,
        message: String,
    },
}

impl Outcome {
    /// Whether this outcome is what `expect` asks for.
    pub fn satisfies(&self, expect: Expect) -> bool {
        match (self, expect) {
            (Self::Ok { .. }, Expect::Success) => true,
            (Self::Error { code, .. }, Expect::Code(want)) => *code == want,
            _ => false,
        }
    }
}

/// Report line for one executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    /// Ledger height the step executed at.
    pub height: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expect>,
    pub passed: bool,
}

/// Result of a whole replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub failures: usize,
    pub final_admin: String,
    pub identities_bound: usize,
    pub final_height: u64,
}

// ── Execution ───────────────────────────────────────────────────────────────

/// Parse a script. Files ending in `.json` are read as JSON, anything else
/// as YAML.
pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let steps = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON script {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML script {}", path.display()))?
    };
    Ok(steps)
}

/// Run `steps` in order against a fresh registry.
///
/// Registry rejections are recorded as outcomes, not errors. Only a script
/// that cannot be executed at all (a height regression) aborts the replay.
pub fn execute(
    steps: &[Step],
    genesis_admin: Principal,
    start_height: BlockHeight,
) -> Result<ReplayReport> {
    let mut registry =
        Registry::with_heights(genesis_admin, LedgerHeight::starting_at(start_height));
    let mut reports = Vec::with_capacity(steps.len());

    for (index, step) in steps.iter().enumerate() {
        let op = step.call.op();
        let height = registry.height().get();
        let outcome = apply(&mut registry, &step.call)
            .with_context(|| format!("step {index} ({op}) could not be executed"))?;
        let passed = step.expect.map_or(true, |e| outcome.satisfies(e));

        match &outcome {
            Outcome::Ok { .. } => tracing::debug!(index, op, height, "step ok"),
            Outcome::Error { code, .. } => tracing::debug!(index, op, height, code, "step rejected"),
        }
        if !passed {
            tracing::warn!(index, op, "step did not meet its expectation");
        }

        reports.push(StepReport {
            index,
            op,
            height,
            outcome,
            expected: step.expect,
            passed,
        });
    }

    let failures = reports.iter().filter(|r| !r.passed).count();
    Ok(ReplayReport {
        steps: reports,
        failures,
        final_admin: registry.admin().to_string(),
        identities_bound: registry.len(),
        final_height: registry.height().get(),
    })
}

fn apply(registry: &mut Registry<LedgerHeight>, call: &Call) -> Result<Outcome> {
    let result = match call {
        Call::Bind {
            caller,
            identity_hash,
            issued_by,
            recovery_guardians,
        } => registry
            .bind(
                caller,
                identity_hash.clone(),
                issued_by.clone(),
                recovery_guardians.iter().cloned(),
            )
            .map(|()| None),
        Call::IsBound { principal } => Ok(Some(Value::Bool(registry.is_identity_bound(principal)))),
        Call::GetHash { principal } => registry
            .get_identity_hash(principal)
            .map(|h| Some(Value::String(h.to_string()))),
        Call::GetRecord { principal } => match registry.identity_record(principal) {
            Ok(record) => Ok(Some(serde_json::to_value(record)?)),
            Err(err) => Err(err),
        },
        Call::Revoke { caller, principal } => {
            registry.revoke_identity(caller, principal).map(|()| None)
        }
        Call::Recover {
            caller,
            lost,
            new_principal,
        } => registry
            .recover_identity(caller, lost, new_principal)
            .map(|()| None),
        Call::TransferAdmin { caller, new_admin } => registry
            .transfer_admin(caller, new_admin.clone())
            .map(|()| None),
        Call::AdvanceHeight { height } => {
            registry.heights_mut().advance_to(BlockHeight(*height))?;
            Ok(None)
        }
    };

    Ok(match result {
        Ok(value) => Outcome::Ok { value },
        Err(err) => Outcome::Error {
            code: err.code(),
            name: err.name(),
            message: err.to_string(),
        },
    })
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Render a report as text or JSON.
pub fn render_report(report: &ReplayReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for step in &report.steps {
                let result = match &step.outcome {
                    Outcome::Ok { value: None } => "ok".to_string(),
                    Outcome::Ok { value: Some(v) } => format!("ok {v}"),
                    Outcome::Error { code, name, message } => {
                        format!("error {code} {name}: {message}")
                    }
                };
                out.push_str(&format!(
                    "#{:<3} @{:<6} {:<15} {}",
                    step.index, step.height, step.op, result
                ));
                if !step.passed {
                    let want = match step.expected {
                        Some(Expect::Code(code)) => code.to_string(),
                        _ => "ok".to_string(),
                    };
                    out.push_str(&format!("  [FAIL: expected {want}]"));
                }
                out.push('\n');
            }
            out.push_str(&format!(
                "{} steps, {} failed; admin {}, {} identities bound, height {}",
                report.steps.len(),
                report.failures,
                report.final_admin,
                report.identities_bound,
                report.final_height
            ));
            Ok(out)
        }
    }
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs) -> Result<u8> {
    let genesis_admin =
        Principal::new(args.genesis_admin.as_str()).context("invalid --genesis-admin")?;
    let steps = load_script(&args.script)?;
    tracing::info!(
        script = %args.script.display(),
        steps = steps.len(),
        "replaying script"
    );

    let report = execute(&steps, genesis_admin, BlockHeight(args.height))?;
    println!("{}", render_report(&report, args.format)?);

    if report.failures > 0 {
        Ok(EXIT_EXPECTATION_FAILED)
    } else {
        Ok(0)
    }
}
