use crate::error::Result;
use std::process::Command;

/// Build a direct program invocation, optionally through `sudo`.
///
/// - Unix: `program args...` or `sudo program args...`
/// - Other platforms: elevated execution is not supported
pub fn build_program_command(program: &str, args: &[String], elevated: bool) -> Result<Command> {
    #[cfg(unix)]
    {
        let cmd = if elevated {
            let mut c = Command::new("sudo");
            c.arg(program);
            c.args(args);
            c
        } else {
            let mut c = Command::new(program);
            c.args(args);
            c
        };

        Ok(cmd)
    }

    #[cfg(not(unix))]
    {
        if elevated {
            return Err(crate::error::PkgsyncError::Other(
                "Elevated execution is not implemented on this platform".to_string(),
            ));
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_program_non_elevated_works() {
        let cmd = build_program_command("echo", &["ok".to_string()], false).unwrap();
        assert_eq!(cmd.get_program(), "echo");
    }

    #[cfg(unix)]
    #[test]
    fn build_program_elevated_prefixes_sudo() {
        let cmd = build_program_command("pacman", &["-Syu".to_string()], true).unwrap();
        assert_eq!(cmd.get_program(), "sudo");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["pacman", "-Syu"]);
    }
}
