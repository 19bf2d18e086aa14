//! Integration tests for error types

#[cfg(test)]
mod tests {
    use pkgfront_errors::*;

    #[test]
    fn test_error_conversion() {
        let runner_err = RunnerError::failed("Channel not found", None);
        let err: Error = runner_err.into();
        assert!(matches!(err, Error::Runner(_)));
    }

    #[test]
    fn test_runner_message_and_user_info() {
        let err = RunnerError::failed(
            "Channel not found",
            Some("channel \"foo.example.com\" does not exist".into()),
        );
        assert_eq!(err.message(), "Channel not found");
        assert_eq!(
            err.user_info(),
            Some("channel \"foo.example.com\" does not exist")
        );
    }

    #[test]
    fn test_exit_status_user_info_is_trimmed_stderr() {
        let err = RunnerError::ExitStatus {
            program: "pear".into(),
            code: 1,
            stderr: "  unknown channel\n".into(),
        };
        assert_eq!(err.message(), "pear exited with status 1");
        assert_eq!(err.user_info(), Some("unknown channel"));

        let quiet = RunnerError::ExitStatus {
            program: "pear".into(),
            code: 1,
            stderr: "\n".into(),
        };
        assert_eq!(quiet.user_info(), None);
    }

    #[test]
    fn test_user_facing_hint() {
        let err: Error = RunnerError::SpawnFailed {
            program: "pear".into(),
            message: "not found".into(),
        }
        .into();
        assert!(err.user_hint().is_some());
        assert_eq!(err.user_code(), Some("runner.spawn_failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_clone() {
        let err = ConfigError::InvalidValue {
            field: "PKGFRONT_COLOR".into(),
            value: "purple".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert_eq!(err.to_string(), "invalid value for PKGFRONT_COLOR: purple");
    }
}
