//! Integration tests for the text-matching classifier

#[cfg(test)]
mod tests {
    use pkgfront_classifier::*;
    use pkgfront_events::RunnerEvent;
    use serde_json::json;

    fn ctx(has_serious_error: bool) -> ClassifyContext<'static> {
        ClassifyContext {
            has_serious_error,
            package: Some("Console_Getopt"),
        }
    }

    fn logged(c: &Classification) -> Vec<&str> {
        c.effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::AppendLog { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_install_output_is_terminal() {
        for command in ["install", "upgrade", "upgrade-all"] {
            let event = RunnerEvent::output(command, json!({"data": "Install complete"}));
            let c = TextMatchClassifier.classify(&event, &ctx(false));
            assert_eq!(c.category, EventCategory::Completion);
            assert!(c.is_terminal());
            assert_eq!(logged(&c), vec!["Install complete"]);
            assert!(c.effects.contains(&Effect::SetAction {
                text: "Installation of Console_Getopt done".into()
            }));
        }
    }

    #[test]
    fn test_uninstall_without_prior_error_is_success() {
        let event = RunnerEvent::output("uninstall", serde_json::Value::Null);
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert_eq!(c.category, EventCategory::Completion);
        assert!(c.is_terminal());
        assert_eq!(logged(&c), vec!["Uninstall ok"]);
        assert!(!c.effects.contains(&Effect::ExpandLog));
    }

    #[test]
    fn test_uninstall_after_error_is_error_terminal() {
        let event = RunnerEvent::output("uninstall", serde_json::Value::Null);
        let c = TextMatchClassifier.classify(&event, &ctx(true));
        assert_eq!(c.category, EventCategory::SeriousError);
        assert!(c.is_terminal());
        assert!(c.effects.contains(&Effect::ExpandLog));
        assert!(c.effects.contains(&Effect::SetAction {
            text: "Error uninstalling Console_Getopt".into()
        }));
    }

    #[test]
    fn test_channel_results_are_terminal() {
        for command in ["channel-discover", "channel-delete"] {
            let event = RunnerEvent::output(command, json!("Deleting channel \"foo\" succeeded"));
            let c = TextMatchClassifier.classify(&event, &ctx(false));
            assert!(c.is_terminal());
            assert_eq!(logged(&c), vec!["Deleting channel \"foo\" succeeded"]);
        }
    }

    #[test]
    fn test_build_only_logs() {
        let event = RunnerEvent::output("build", json!("running: phpize"));
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert_eq!(
            c.effects,
            vec![Effect::AppendLog {
                text: "running: phpize".into(),
                newline: true
            }]
        );
    }

    #[test]
    fn test_up_to_date_finishes_without_error() {
        let event = RunnerEvent::data("Ignoring installed package pear/Foo: IS UP TO DATE");
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert_eq!(c.category, EventCategory::Completion);
        assert!(c.is_terminal());
        assert!(!c.marks_serious_error());
    }

    #[test]
    fn test_free_form_error_finishes_with_error() {
        let event = RunnerEvent::data("Error: cannot download \"pear/Foo\"");
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert!(c.is_terminal());
        assert!(c.marks_serious_error());
    }

    #[test]
    fn test_plain_free_form_text_is_informational() {
        let event = RunnerEvent::data("downloading Foo-1.0.tgz");
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert_eq!(c.category, EventCategory::Informational);
        assert!(!c.is_terminal());
        assert!(c.effects.contains(&Effect::SetAction {
            text: "downloading Foo-1.0.tgz".into()
        }));
    }

    #[test]
    fn test_headline_with_record_list() {
        let event = RunnerEvent::data(json!({
            "headline": "Installed packages",
            "data": [
                {"package": "Foo", "version": "1.0"},
                {"package": "Bar", "version": "2.1"}
            ]
        }));
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert!(!c.is_terminal());
        assert_eq!(
            logged(&c),
            vec!["!!!Installed packages!!!", "Foo / 1.0", "Bar / 2.1"]
        );
    }

    #[test]
    fn test_error_headline_marks_and_finishes() {
        let event = RunnerEvent::data(json!({
            "headline": "Download Errors",
            "data": "Foo-1.0.tgz: connection refused"
        }));
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert!(c.is_terminal());
        assert!(c.marks_serious_error());
        assert_eq!(
            logged(&c),
            vec!["!!!Download Errors!!!", "Foo-1.0.tgz: connection refused"]
        );
    }

    #[test]
    fn test_headline_with_unhandled_data_shape() {
        let event = RunnerEvent::data(json!({"headline": "Summary", "data": {"count": 3}}));
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert_eq!(
            logged(&c),
            vec!["!!!Summary!!!", "unhandled payload shape: object"]
        );
    }

    #[test]
    fn test_unknown_free_form_shape_degrades() {
        let event = RunnerEvent::data(json!([1, 2, 3]));
        let c = TextMatchClassifier.classify(&event, &ctx(false));
        assert_eq!(c.category, EventCategory::Diagnostic);
        assert_eq!(logged(&c), vec!["unhandled payload shape: array"]);
        assert!(!c.is_terminal());
    }
}
