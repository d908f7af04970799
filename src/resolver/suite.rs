//! Full-suite discovery

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

use super::ResolveError;
use crate::executor::{run_with_timeout, TestHarness};
use crate::models::TestId;

fn id_in_parens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*\s+\((.+)\)\s*$").expect("discovery pattern is valid"))
}

/// One identifier per discovered test, parametrized variants included.
///
/// `test_x (__main__.Class.test_x)` yields the id in parentheses; suite
/// reprs (`<unittest.suite.TestSuite ...>`) and blank lines are skipped;
/// anything else is taken verbatim.
pub fn parse_discovery_output(stdout: &str) -> Vec<TestId> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('<') && !line.contains("TestSuite tests="))
        .map(|line| match id_in_parens().captures(line) {
            Some(caps) => TestId::new(caps[1].trim()),
            None => TestId::new(line),
        })
        .collect()
}

/// Keep identifiers the pattern matches anywhere
pub fn filter_tests(tests: Vec<TestId>, pattern: &Regex) -> Vec<TestId> {
    tests
        .into_iter()
        .filter(|t| pattern.is_match(t.as_str()))
        .collect()
}

/// Ask the harness for every test in the suite
pub async fn discover<H: TestHarness>(
    harness: &H,
    limit: Duration,
    grace: Duration,
) -> Result<Vec<TestId>, ResolveError> {
    info!("Discovering tests (timeout {}s)", limit.as_secs());

    let output = run_with_timeout(harness.discovery_command(), limit, grace)
        .await
        .map_err(|e| ResolveError::Discovery(e.to_string()))?;

    if output.timed_out {
        return Err(ResolveError::Discovery(format!(
            "timed out after {}s",
            limit.as_secs()
        )));
    }
    if output.exit_code != Some(0) {
        let stderr = output.stderr.trim();
        return Err(ResolveError::Discovery(format!(
            "exit {}. stderr: {}",
            output
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "by signal".to_string()),
            if stderr.is_empty() { "(none)" } else { stderr }
        )));
    }

    let tests = parse_discovery_output(&output.stdout);
    debug!("Discovery produced {} id(s)", tests.len());
    if tests.is_empty() {
        return Err(ResolveError::Discovery(
            "no tests discovered; check that the test file supports --discover-tests".to_string(),
        ));
    }
    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mode;
    use tokio::process::Command;

    struct ScriptedDiscovery(&'static str);

    impl TestHarness for ScriptedDiscovery {
        fn test_command(&self, _id: &TestId, _mode: Mode) -> Command {
            Command::new("true")
        }

        fn discovery_command(&self) -> Command {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(self.0);
            cmd
        }
    }

    fn names(ids: &[TestId]) -> Vec<&str> {
        ids.iter().map(|i| i.as_str()).collect()
    }

    #[test]
    fn test_parse_discovery_output() {
        let stdout = "\
<unittest.suite.TestSuite tests=[<unittest.suite.TestSuite tests=[...]>]>
test_3d_tiling (__main__.CudaReproTests.test_3d_tiling)
test_param_cuda_float32 (__main__.CudaReproTests.test_param_cuda_float32)
test_param_cuda_float16 (__main__.CudaReproTests.test_param_cuda_float16)

plain_test_name
";
        assert_eq!(
            names(&parse_discovery_output(stdout)),
            vec![
                "__main__.CudaReproTests.test_3d_tiling",
                "__main__.CudaReproTests.test_param_cuda_float32",
                "__main__.CudaReproTests.test_param_cuda_float16",
                "plain_test_name",
            ]
        );
    }

    #[test]
    fn test_filter_tests() {
        let tests = vec![
            TestId::from("__main__.A.test_conv_cuda"),
            TestId::from("__main__.A.test_mm"),
            TestId::from("__main__.B.test_conv_cpu"),
        ];
        let re = Regex::new("conv").unwrap();
        assert_eq!(
            names(&filter_tests(tests.clone(), &re)),
            vec!["__main__.A.test_conv_cuda", "__main__.B.test_conv_cpu"]
        );
        let re = Regex::new("^nothing$").unwrap();
        assert!(filter_tests(tests, &re).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_discover_success() {
        let harness = ScriptedDiscovery(
            "echo 'test_a (__main__.T.test_a)'; echo 'test_b (__main__.T.test_b)'",
        );
        let tests = discover(&harness, Duration::from_secs(10), Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(names(&tests), vec!["__main__.T.test_a", "__main__.T.test_b"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_discover_failures() {
        let grace = Duration::from_millis(500);

        let failing = ScriptedDiscovery("echo 'ImportError: torch' >&2; exit 1");
        let err = discover(&failing, Duration::from_secs(10), grace)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ImportError: torch"));

        let empty = ScriptedDiscovery("exit 0");
        assert!(matches!(
            discover(&empty, Duration::from_secs(10), grace).await,
            Err(ResolveError::Discovery(_))
        ));

        let slow = ScriptedDiscovery("sleep 30");
        let err = discover(&slow, Duration::from_millis(200), grace)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
