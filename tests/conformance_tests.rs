#[cfg(test)]
mod tests {
    use cldr_format::Formatter;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Deserialize)]
    struct TestCase {
        function: String,
        value: String,
        locale: String,
        #[serde(default)]
        args: BTreeMap<String, String>,
        expected: String,
    }

    #[derive(Debug, Deserialize)]
    struct TestCases {
        cases: Vec<TestCase>,
    }

    fn load_cases() -> TestCases {
        let toml_path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("cldr-cases.toml");
        let toml_content = fs::read_to_string(&toml_path)
            .unwrap_or_else(|e| panic!("Failed to read TOML file {}: {}", toml_path.display(), e));
        toml::from_str(&toml_content)
            .unwrap_or_else(|e| panic!("Failed to parse TOML file {}: {}", toml_path.display(), e))
    }

    fn run_test_case(formatter: &Formatter, case: &TestCase) -> Result<(), String> {
        let args: Vec<(&str, &str)> = case
            .args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let result = formatter
            .call(&case.function, &case.value, &case.locale, &args)
            .map_err(|e| format!("{}({}) in {} failed: {e}", case.function, case.value, case.locale))?;

        if result != case.expected {
            return Err(format!(
                "\n✗ Mismatch for {}({}) in {}\nArgs:       {:?}\nExpected:   {:?}\nActual:     {:?}",
                case.function, case.value, case.locale, case.args, case.expected, result
            ));
        }
        Ok(())
    }

    #[test]
    fn test_cldr_cases() {
        let suite = load_cases();
        assert!(!suite.cases.is_empty());

        let formatter = Formatter::embedded();
        let failures: Vec<String> = suite
            .cases
            .iter()
            .enumerate()
            .filter_map(|(i, case)| {
                run_test_case(&formatter, case)
                    .err()
                    .map(|msg| format!("[Case {}] {msg}", i + 1))
            })
            .collect();

        assert!(
            failures.is_empty(),
            "{} of {} cases failed:\n{}",
            failures.len(),
            suite.cases.len(),
            failures.join("\n")
        );
    }

    #[test]
    fn test_cases_are_stable_on_a_shared_formatter() {
        let suite = load_cases();
        let formatter = Formatter::embedded();
        let first: Vec<_> = suite
            .cases
            .iter()
            .map(|case| run_test_case(&formatter, case).is_ok())
            .collect();
        let second: Vec<_> = suite
            .cases
            .iter()
            .rev()
            .map(|case| run_test_case(&formatter, case).is_ok())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert_eq!(first, second);
    }
}
