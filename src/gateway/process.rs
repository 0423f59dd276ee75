//! sqlite3 shell adapter
//!
//! Runs `sqlite3 -batch -list -noheader <db> <sql>` as a child process and
//! parses its list-mode output (`|`-separated columns, one row per line). The
//! flags are always passed so a user `.sqliterc` cannot change the output
//! format. The child is killed if it outlives the timeout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{bounded, inline_sql, SearchGateway};
use crate::replay::{MatchExpression, ReplayError, ReplayResult, MAX_RESULTS};
use crate::types::LearningRecord;

/// Column separator of the sqlite3 shell's list mode
const COLUMN_SEPARATOR: char = '|';

/// Output mode the row parser expects
const SHELL_FLAGS: [&str; 3] = ["-batch", "-list", "-noheader"];

/// Adapter that shells out to a sqlite3 binary
pub struct ProcessGateway {
    program: String,
    program_args: Vec<String>,
    db_path: PathBuf,
    timeout: Duration,
}

impl ProcessGateway {
    pub fn new(program: &str, db_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            program_args: Vec::new(),
            db_path: db_path.into(),
            timeout,
        }
    }

    /// Extra arguments placed before the shell flags
    pub fn with_program_args(mut self, args: Vec<String>) -> Self {
        self.program_args = args;
        self
    }

    fn command(&self, expr: &MatchExpression) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.program_args)
            .args(SHELL_FLAGS)
            .arg(store_arg(&self.db_path))
            .arg(inline_sql(expr));
        cmd
    }
}

/// The store path as a shell argument; relative paths get a `./` prefix so a
/// name like `-data.db` is never read as an option
fn store_arg(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(".").join(path)
    }
}

/// Parse list-mode output into records, skipping blank lines
pub fn parse_rows(stdout: &str) -> Vec<LearningRecord> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| LearningRecord::from_delimited(line.trim_end_matches('\r'), COLUMN_SEPARATOR))
        .take(MAX_RESULTS)
        .collect()
}

#[async_trait]
impl SearchGateway for ProcessGateway {
    fn is_available(&self) -> bool {
        self.db_path.is_file()
    }

    async fn search(&self, expr: &MatchExpression) -> ReplayResult<Vec<LearningRecord>> {
        if !self.is_available() {
            return Err(ReplayError::AbsentStore(self.db_path.display().to_string()));
        }

        let child = self
            .command(expr)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the child on timeout kills it
        let output = bounded(self.timeout, async {
            child.wait_with_output().await.map_err(ReplayError::from)
        })
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReplayError::EngineFailure(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ReplayError::EngineFailure(format!("non UTF-8 output: {}", e)))?;

        Ok(parse_rows(&stdout))
    }

    fn name(&self) -> &'static str {
        "sqlite3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::QueryBuilder;
    use std::time::Instant;
    use tempfile::tempdir;

    fn expr() -> MatchExpression {
        QueryBuilder::new().build(&["retry", "logic"]).unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let out = "git|Rebase before pushing|Merged a stale main\n\nshell|Quote paths|\nbare\n";
        let records = parse_rows(out);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], LearningRecord::new("git", "Rebase before pushing", "Merged a stale main"));
        assert_eq!(records[1], LearningRecord::new("shell", "Quote paths", ""));
        assert_eq!(records[2], LearningRecord::new("bare", "", ""));
    }

    #[test]
    fn test_parse_rows_caps_results() {
        let out = (0..8).map(|i| format!("c|rule {}|", i)).collect::<Vec<_>>().join("\n");
        assert_eq!(parse_rows(&out).len(), MAX_RESULTS);
    }

    #[test]
    fn test_parse_rows_crlf() {
        let records = parse_rows("ci|Pin the toolchain|Floating nightly\r\n");
        assert_eq!(records[0].mistake, "Floating nightly");
    }

    #[tokio::test]
    async fn test_missing_store_skips_process() {
        let dir = tempdir().unwrap();
        // Spawning this would fail; the precondition must stop us first
        let gateway = ProcessGateway::new("no-such-sqlite3-binary", dir.path().join("data.db"), Duration::from_secs(3));
        let err = gateway.search(&expr()).await.unwrap_err();
        assert_eq!(err.kind(), "absent_store");
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_failure() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        std::fs::write(&db_path, "").unwrap();

        let gateway = ProcessGateway::new("no-such-sqlite3-binary", &db_path, Duration::from_secs(3));
        let err = gateway.search(&expr()).await.unwrap_err();
        assert_eq!(err.kind(), "engine_failure");
    }

    // `sh -c <script> sqlite3 <flags..> <db> <sql>` stands in for the
    // sqlite3 shell: the flags arrive as $1..$3, the store as $4, the SQL as $5

    fn shell(script: &str, store: &Path, timeout: Duration) -> ProcessGateway {
        ProcessGateway::new("sh", store, timeout).with_program_args(vec![
            "-c".to_string(),
            script.to_string(),
            "sqlite3".to_string(),
        ])
    }

    fn empty_store(dir: &Path, name: &str) -> PathBuf {
        let store = dir.join(name);
        std::fs::write(&store, "").unwrap();
        store
    }

    #[test]
    fn test_store_arg() {
        assert_eq!(store_arg(Path::new("-data.db")), PathBuf::from("./-data.db"));
        assert_eq!(store_arg(Path::new("db/data.db")), PathBuf::from("./db/data.db"));
        assert_eq!(store_arg(Path::new("/srv/-data.db")), PathBuf::from("/srv/-data.db"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_parses_child_output_and_passes_sql() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path(), "data.db");
        let script = "printf 'concurrency|Lock before retry|Raced the scheduler\\n'\nprintf 'sql|%s|\\n' \"$5\"";

        let records = shell(script, &store, Duration::from_secs(3)).search(&expr()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], LearningRecord::new("concurrency", "Lock before retry", "Raced the scheduler"));
        assert!(records[1].rule.contains(r#"MATCH '"retry" OR "logic"'"#));
        assert!(records[1].rule.contains("ORDER BY bm25(learnings_fts)"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_forces_list_mode_before_the_store() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path(), "data.db");
        let script = "printf 'args|%s %s %s|%s\\n' \"$1\" \"$2\" \"$3\" \"$4\"";

        let records = shell(script, &store, Duration::from_secs(3)).search(&expr()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rule, "-batch -list -noheader");
        assert_eq!(records[0].mistake, store.display().to_string());
    }

    #[test]
    fn test_dash_prefixed_store_is_not_an_option() {
        let gateway = ProcessGateway::new("sqlite3", "-data.db", Duration::from_secs(3))
            .with_program_args(vec!["-cmd".to_string(), ".timeout 100".to_string()]);
        let cmd = gateway.command(&expr());
        let args: Vec<&std::ffi::OsStr> = cmd.as_std().get_args().collect();

        assert_eq!(args.len(), 7);
        assert_eq!(args[..5], ["-cmd", ".timeout 100", "-batch", "-list", "-noheader"]);
        assert_eq!(args[5], "./-data.db");
        assert!(args[6].to_string_lossy().starts_with("SELECT "));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_engine_failure() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path(), "data.db");
        let script = "echo 'Error: no such table: learnings' >&2\nexit 1";

        let err = shell(script, &store, Duration::from_secs(3)).search(&expr()).await.unwrap_err();
        match err {
            ReplayError::EngineFailure(msg) => assert!(msg.contains("no such table")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_child_times_out() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path(), "data.db");

        let gateway = shell("sleep 5\necho 'late|never|seen'", &store, Duration::from_millis(200));
        let started = Instant::now();
        let err = gateway.search(&expr()).await.unwrap_err();
        assert!(matches!(err, ReplayError::Timeout(200)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
