//! Integration tests for types

#[cfg(test)]
mod tests {
    use pkgfront_types::*;

    #[test]
    fn test_target_runner_argument() {
        let target = OperationTarget::parse_package_or_file("foo/bar-1.0").unwrap();
        assert_eq!(target.runner_argument(), "channel://foo/bar-1.0");
        assert_eq!(target.package(), Some("bar"));
        assert!(matches!(
            &target,
            OperationTarget::Package(spec) if spec.channel == "foo" && spec.version.as_deref() == Some("1.0")
        ));
        assert_eq!(target.to_string(), "foo/bar");
    }

    #[test]
    fn test_absolute_path_is_file_install() {
        let target = OperationTarget::parse_package_or_file("/tmp/Foo-1.0.tgz").unwrap();
        assert_eq!(target.runner_argument(), "/tmp/Foo-1.0.tgz");
    }

    #[test]
    fn test_operation_kind_serialization() {
        let json = serde_json::to_string(&OperationKind::ChannelDiscover).unwrap();
        assert_eq!(json, r#""channel-discover""#);
    }

    #[test]
    fn test_target_serialization() {
        let target = OperationTarget::Channel("foo.example.com".into());
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, r#"{"type":"channel","value":"foo.example.com"}"#);
    }

    #[test]
    fn test_color_choice_serialization() {
        let json = serde_json::to_string(&ColorChoice::Never).unwrap();
        assert_eq!(json, r#""never""#);
    }
}
