//! Run tool - execute Python scripts in the working directory.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Maximum time a script may run.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute a Python file inside the working directory via `python3`.
pub struct RunPythonFileTool {
    timeout: Duration,
}

impl RunPythonFileTool {
    /// Create the tool with the standard 30 second timeout.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create the tool with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RunPythonFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RunPythonFileTool {
    fn id(&self) -> &str {
        "run_python_file"
    }

    fn description(&self) -> &str {
        "Executes a Python file within the working directory and returns the output from the interpreter."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the Python file to execute, relative to the working directory."
                },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional arguments to pass to the Python file."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let file_path = args["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::validation("file_path parameter is required"))?;

        let extra_args: Vec<String> = args["args"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let path = ctx.resolve(file_path).ok_or_else(|| {
            ToolError::permission_denied(format!(
                "Cannot execute \"{file_path}\" as it is outside the permitted working directory"
            ))
        })?;

        if !path.is_file() {
            return Err(ToolError::file_not_found(format!("\"{file_path}\"")));
        }

        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            return Err(ToolError::validation(format!(
                "\"{file_path}\" is not a Python file"
            )));
        }

        debug!(path = %path.display(), args = ?extra_args, "running python file");

        let mut cmd = Command::new("python3");
        cmd.arg(&path)
            .args(&extra_args)
            .current_dir(&ctx.root_dir)
            .kill_on_drop(true);

        let output = tokio::select! {
            _ = ctx.abort.cancelled() => return Err(ToolError::Cancelled),
            res = tokio::time::timeout(self.timeout, cmd.output()) => {
                res.map_err(|_| ToolError::Timeout(self.timeout))??
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut text = if stdout.is_empty() && stderr.is_empty() {
            "No output produced.".to_string()
        } else {
            format!("STDOUT: {stdout}\nSTDERR: {stderr}")
        };

        let exit_code = output.status.code();
        if !output.status.success() {
            text.push_str(&format!(
                "\nProcess exited with code {}",
                exit_code.unwrap_or(-1)
            ));
        }

        Ok(ToolOutput::new(format!("python3 {file_path}"), text).with_metadata(json!({
            "exit_code": exit_code,
            "file_path": file_path
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_run_prints_stdout() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hello.py"), "print('hello world')").unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let result = tool
            .execute(json!({"file_path": "hello.py"}), &ctx)
            .await
            .unwrap();

        assert!(result.output.starts_with("STDOUT: hello world"));
        assert!(result.output.contains("STDERR:"));
        assert_eq!(result.metadata["exit_code"], 0);
    }

    #[tokio::test]
    async fn test_run_no_output() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("quiet.py"), "x = 1").unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let result = tool
            .execute(json!({"file_path": "quiet.py"}), &ctx)
            .await
            .unwrap();

        assert_eq!(result.output, "No output produced.");
    }

    #[tokio::test]
    async fn test_run_nonzero_exit() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fail.py"), "import sys\nsys.exit(3)").unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let result = tool
            .execute(json!({"file_path": "fail.py"}), &ctx)
            .await
            .unwrap();

        assert!(result.output.contains("Process exited with code 3"));
        assert_eq!(result.metadata["exit_code"], 3);
    }

    #[tokio::test]
    async fn test_run_passes_arguments() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("echo.py"),
            "import sys\nprint(' '.join(sys.argv[1:]))",
        )
        .unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let result = tool
            .execute(
                json!({"file_path": "echo.py", "args": ["3", "+", "5"]}),
                &ctx,
            )
            .await
            .unwrap();

        assert!(result.output.contains("3 + 5"));
    }

    #[tokio::test]
    async fn test_run_cwd_is_working_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("cwd.py"),
            "print(open('data.txt').read())",
        )
        .unwrap();
        fs::write(dir.path().join("data.txt"), "from-root").unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let result = tool
            .execute(json!({"file_path": "cwd.py"}), &ctx)
            .await
            .unwrap();

        assert!(result.output.contains("from-root"));
    }

    #[tokio::test]
    async fn test_run_rejects_non_python() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let err = tool
            .execute(json!({"file_path": "notes.txt"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Validation(_)));
        assert!(err.to_string().contains("is not a Python file"));
    }

    #[tokio::test]
    async fn test_run_missing_file() {
        let dir = tempdir().unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let err = tool
            .execute(json!({"file_path": "missing.py"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_run_outside_root() {
        let dir = tempdir().unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        let err = tool
            .execute(json!({"file_path": "../evil.py"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_run_times_out_and_kills_script() {
        let dir = tempdir().unwrap();
        // Writes a marker only if it survives the sleep
        fs::write(
            dir.path().join("slow.py"),
            "import time\ntime.sleep(60)\nopen('done.txt', 'w').write('x')",
        )
        .unwrap();

        let timeout = Duration::from_millis(200);
        let tool = RunPythonFileTool::with_timeout(timeout);
        let ctx = ToolContext::new(dir.path());
        let err = tool
            .execute(json!({"file_path": "slow.py"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout(t) if t == timeout));
        assert!(!dir.path().join("done.txt").exists());
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("sleep.py"),
            "import time\ntime.sleep(60)",
        )
        .unwrap();

        let tool = RunPythonFileTool::new();
        let ctx = ToolContext::new(dir.path());
        ctx.abort.cancel();

        let err = tool
            .execute(json!({"file_path": "sleep.py"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Cancelled));
    }
}
