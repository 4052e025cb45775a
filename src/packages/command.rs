//! External process execution shared by all backends.
//!
//! No timeout is imposed: package manager invocations run to completion.

use crate::core::events::Reporter;
use crate::core::types::ManagerKind;
use crate::error::{PkgsyncError, Result};
use crate::ui;
use crate::utils::platform::build_program_command;
use crate::utils::sanitize;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

/// Run a read-only query and return its stdout.
///
/// Returns `None` when the command cannot be spawned or exits with a code
/// outside `ok_codes` (an empty `ok_codes` means only success).
pub(crate) fn query_with_codes(
    kind: ManagerKind,
    program: &str,
    args: &[&str],
    ok_codes: &[i32],
) -> Option<String> {
    let label = command_label(program, args);
    let output = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            ui::verbose(&format!("[{}] could not run '{}': {}", kind, label, e));
            return None;
        }
    };

    let accepted = output.status.success()
        || output
            .status
            .code()
            .is_some_and(|code| ok_codes.contains(&code));

    if !accepted {
        ui::verbose(&format!(
            "[{}] '{}' exited with {}: {}",
            kind,
            label,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub(crate) fn query(kind: ManagerKind, program: &str, args: &[&str]) -> Option<String> {
    query_with_codes(kind, program, args, &[])
}

/// Like [`query`], for answers where an empty result would be unsafe to assume
pub(crate) fn require(kind: ManagerKind, program: &str, args: &[&str]) -> Result<String> {
    query(kind, program, args).ok_or_else(|| PkgsyncError::SystemCommandFailed {
        command: command_label(program, args),
        reason: format!("{} query did not succeed", kind),
    })
}

/// Run a mutating command, forwarding its output to the reporter.
///
/// In console mode the child inherits the terminal so prompts from the
/// manager itself (sudo password, pager) keep working.
pub(crate) fn run(
    kind: ManagerKind,
    program: &str,
    args: &[String],
    elevated: bool,
    out: &Reporter,
) -> bool {
    let label = command_label(program, args);
    ui::verbose(&format!("[{}] running '{}'", kind, label));

    let mut cmd = match build_program_command(program, args, elevated) {
        Ok(cmd) => cmd,
        Err(e) => {
            out.warning(&format!("{}: {}", label, e));
            return false;
        }
    };

    let result = if out.is_streaming() {
        run_streaming(&mut cmd, kind, &label, out)
    } else {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map(|status| status.success())
            .map_err(|e| PkgsyncError::SystemCommandFailed {
                command: label.clone(),
                reason: e.to_string(),
            })
    };

    match result {
        Ok(success) => {
            if !success {
                ui::verbose(&format!("[{}] '{}' did not succeed", kind, label));
            }
            success
        }
        Err(e) => {
            out.warning(&e.to_string());
            false
        }
    }
}

fn run_streaming(cmd: &mut Command, kind: ManagerKind, label: &str, out: &Reporter) -> Result<bool> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| PkgsyncError::SystemCommandFailed {
        command: label.to_string(),
        reason: e.to_string(),
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PkgsyncError::SystemCommandFailed {
            command: label.to_string(),
            reason: "Failed to capture stdout".to_string(),
        })?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| PkgsyncError::SystemCommandFailed {
            command: label.to_string(),
            reason: "Failed to capture stderr".to_string(),
        })?;

    thread::scope(|scope| {
        scope.spawn(|| forward_lines(stdout, kind, out));
        scope.spawn(|| forward_lines(stderr, kind, out));
    });

    let status = child.wait().map_err(|e| PkgsyncError::SystemCommandFailed {
        command: label.to_string(),
        reason: e.to_string(),
    })?;

    Ok(status.success())
}

fn forward_lines<R: Read>(stream: R, kind: ManagerKind, out: &Reporter) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => out.output(kind, &line),
            Err(_) => break,
        }
    }
}

fn command_label<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut label = program.to_string();
    for arg in args {
        label.push(' ');
        label.push_str(arg.as_ref());
    }
    label
}

/// Gate for mutating operations: empty lists succeed without running
/// anything, unsafe names fail without running anything.
///
/// Returns `Some(result)` when the caller should return early.
pub(crate) fn precheck(kind: ManagerKind, names: &[String], out: &Reporter) -> Option<bool> {
    if names.is_empty() {
        return Some(true);
    }
    if let Err(e) = sanitize::validate_package_names(names) {
        out.warning(&format!("[{}] {}", kind, e));
        return Some(false);
    }
    None
}

/// Own a list of string slices as command arguments
pub(crate) fn args_with(prefix: &[&str], names: &[String]) -> Vec<String> {
    prefix
        .iter()
        .map(|s| s.to_string())
        .chain(names.iter().cloned())
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::events::EngineEvent;

    #[test]
    fn query_returns_stdout_on_success() {
        let out = query(ManagerKind::Cargo, "sh", &["-c", "echo hello"]);
        assert_eq!(out.as_deref(), Some("hello\n"));
    }

    #[test]
    fn query_returns_none_on_failure() {
        assert!(query(ManagerKind::Cargo, "sh", &["-c", "exit 3"]).is_none());
        assert!(query(ManagerKind::Cargo, "definitely-not-a-binary-xyz", &[]).is_none());
    }

    #[test]
    fn require_turns_failure_into_error() {
        assert_eq!(
            require(ManagerKind::Pacman, "sh", &["-c", "echo ok"]).unwrap(),
            "ok\n"
        );
        let err = require(ManagerKind::Pacman, "sh", &["-c", "exit 1"]).unwrap_err();
        assert!(matches!(err, PkgsyncError::SystemCommandFailed { .. }));
    }

    #[test]
    fn query_accepts_listed_exit_codes() {
        let out = query_with_codes(ManagerKind::Dnf, "sh", &["-c", "echo x; exit 100"], &[100]);
        assert_eq!(out.as_deref(), Some("x\n"));
    }

    #[test]
    fn streaming_run_forwards_lines() {
        let (reporter, events, _answers) = Reporter::channel();
        let ok = run(
            ManagerKind::Apt,
            "sh",
            &["-c".to_string(), "echo one; echo two".to_string()],
            false,
            &reporter,
        );
        assert!(ok);

        let lines: Vec<String> = events
            .try_iter()
            .filter_map(|event| match event {
                EngineEvent::Output { line, .. } => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn failed_run_returns_false() {
        let (reporter, _events, _answers) = Reporter::channel();
        assert!(!run(
            ManagerKind::Apt,
            "sh",
            &["-c".to_string(), "exit 1".to_string()],
            false,
            &reporter
        ));
    }

    #[test]
    fn precheck_short_circuits_empty_and_unsafe_lists() {
        let (reporter, _events, _answers) = Reporter::channel();
        assert_eq!(precheck(ManagerKind::Apt, &[], &reporter), Some(true));
        assert_eq!(
            precheck(ManagerKind::Apt, &["vim; reboot".to_string()], &reporter),
            Some(false)
        );
        assert_eq!(precheck(ManagerKind::Apt, &["vim".to_string()], &reporter), None);
    }

    #[test]
    fn args_with_prefixes_names() {
        let args = args_with(&["install", "-y"], &["git".to_string()]);
        assert_eq!(args, vec!["install", "-y", "git"]);
    }
}
