use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use luto_core::config::RunConfig;
use luto_core::solver::{LinExpr, LpProblem, ObjectiveSense, SolveOptions, SolverAdapter, Variable};
use luto_core::types::SolveStatus;
use luto_solver_lp::ClarabelAdapter;
use tabwriter::TabWriter;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Warn,
}

struct Check {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl Check {
    fn ok(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }
}

pub fn handle(config: Option<&Path>) -> Result<()> {
    let checks = vec![
        check_path_entries(),
        check_cache_dir(),
        check_config(config),
        check_solver(),
    ];

    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Check\tStatus\tDetails")?;
    for check in &checks {
        let status = match check.status {
            CheckStatus::Ok => "ok",
            CheckStatus::Warn => "warn",
        };
        writeln!(writer, "{}\t{}\t{}", check.name, status, check.detail)?;
    }
    writer.flush()?;
    let table = String::from_utf8(writer.into_inner()?)?;
    println!("{table}");

    if checks.iter().any(|c| c.status == CheckStatus::Warn) {
        eprintln!("Some checks reported warnings. Review the details above.");
    }

    Ok(())
}

fn check_path_entries() -> Check {
    match env::var_os("PATH") {
        Some(path) => {
            let count = env::split_paths(&path).count();
            Check::ok("path", format!("PATH set with {count} entries"))
        }
        None => Check::warn("path", "PATH environment variable is not set"),
    }
}

fn check_cache_dir() -> Check {
    match dirs::cache_dir() {
        Some(base) => {
            let path = base.join("luto");
            if path.exists() {
                Check::ok("cache", format!("using cache directory at {}", path.display()))
            } else {
                Check::warn(
                    "cache",
                    format!("preferred cache directory {} does not exist yet", path.display()),
                )
            }
        }
        None => Check::warn("cache", "could not resolve OS cache directory"),
    }
}

fn check_config(config: Option<&Path>) -> Check {
    let Some(path) = config else {
        return Check::warn("config", "no --config given, skipping validation");
    };
    match fs::read_to_string(path) {
        Ok(json) => match RunConfig::from_json(&json) {
            Ok(_) => Check::ok("config", format!("{} parses and validates", path.display())),
            Err(e) => Check::warn("config", format!("{} failed validation: {e}", path.display())),
        },
        Err(e) => Check::warn("config", format!("could not read {}: {e}", path.display())),
    }
}

/// Solve a trivial one-variable minimisation to confirm the Clarabel backend
/// is actually reachable from this binary, not just linked.
fn check_solver() -> Check {
    let problem = LpProblem {
        variables: vec![Variable {
            name: "x".into(),
            lower: 0.0,
            upper: 1.0,
        }],
        objective: LinExpr::default().term(0, 1.0),
        objective_sense: ObjectiveSense::Minimise,
        constraints: vec![],
    };

    let adapter = ClarabelAdapter::new();
    match adapter.build_model(problem) {
        Ok(handle) => match adapter.solve(handle, &SolveOptions::default()) {
            Ok(solution) if solution.status == SolveStatus::Optimal => {
                Check::ok("solver", "Clarabel solved a trivial LP")
            }
            Ok(solution) => Check::warn("solver", format!("trivial LP returned {:?}", solution.status)),
            Err(e) => Check::warn("solver", format!("Clarabel solve failed: {e}")),
        },
        Err(e) => Check::warn("solver", format!("Clarabel model build failed: {e}")),
    }
}
