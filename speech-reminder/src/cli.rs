use std::path::PathBuf;

use clap::Parser;

use crate::error::WorkingDirError;

/// Exit status for usage and working-directory errors.
pub const EXIT_USAGE: u8 = 2;

/// Announces upcoming calendar events by speech.
#[derive(Debug, Parser)]
#[command(name = "speech-reminder", version, about)]
pub struct Cli {
    /// Directory holding preferences.toml, the OAuth credentials and the alert tone
    #[arg(short, long, value_name = "PATH")]
    pub dir: Option<PathBuf>,
}

impl Cli {
    /// Change into `--dir`, if given.
    pub fn enter_working_dir(&self) -> Result<(), WorkingDirError> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };

        if !dir.is_dir() {
            return Err(WorkingDirError::NotADirectory(dir.clone()));
        }

        std::env::set_current_dir(dir).map_err(|source| WorkingDirError::Enter {
            path: dir.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["speech-reminder"]).expect("should parse");
        assert!(cli.dir.is_none());
        assert!(cli.enter_working_dir().is_ok());
    }

    #[test]
    fn test_short_and_long_dir() {
        let short = Cli::try_parse_from(["speech-reminder", "-d", "/tmp"]).expect("should parse");
        let long = Cli::try_parse_from(["speech-reminder", "--dir", "/tmp"]).expect("should parse");
        assert_eq!(short.dir, Some(PathBuf::from("/tmp")));
        assert_eq!(long.dir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_help_exits_successfully() {
        let err = Cli::try_parse_from(["speech-reminder", "-h"]).expect_err("help is an early exit");
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_unknown_argument_is_usage_error() {
        let err = Cli::try_parse_from(["speech-reminder", "--bogus"]).expect_err("should reject");
        assert_eq!(err.exit_code(), i32::from(EXIT_USAGE));
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let cli = Cli {
            dir: Some(PathBuf::from("/definitely/not/here")),
        };
        assert!(matches!(
            cli.enter_working_dir(),
            Err(WorkingDirError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().expect("should create file");
        let cli = Cli {
            dir: Some(file.path().to_path_buf()),
        };
        assert!(matches!(
            cli.enter_working_dir(),
            Err(WorkingDirError::NotADirectory(_))
        ));
    }
}
