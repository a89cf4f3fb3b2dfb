//! Python runtime: the program is passed inline with `-c`

use super::{
    indent_body, RuntimeAdapter, WorkspaceLayout, WrappedProgram, COMPLETION_SENTINEL,
    PLACEHOLDER_PRIVATE_KEY,
};
use crate::environment::ExecutionEnvironment;
use crate::errors::Result;
use crate::execution::ProcessConfig;
use crate::language::Language;
use std::path::PathBuf;

const BODY_INDENT: &str = "    ";

#[derive(Debug, Clone)]
pub struct PythonAdapter {
    interpreter: PathBuf,
}

impl PythonAdapter {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

/// True when the snippet has nothing but blank lines and comments.
fn has_no_statements(code: &str) -> bool {
    code.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

impl RuntimeAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn wrap(&self, code: &str) -> WrappedProgram {
        let mut body = indent_body(code, BODY_INDENT);
        if has_no_statements(code) {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(BODY_INDENT);
            body.push_str("pass");
        }

        let source = format!(
            r#"import asyncio

# Playground credentials: read-only placeholder, not a real key
mock_private_key = '{key}'

async def main():
{body}

asyncio.run(main())
print('')
print('{sentinel}')
"#,
            key = PLACEHOLDER_PRIVATE_KEY,
            body = body,
            sentinel = COMPLETION_SENTINEL,
        );

        WrappedProgram::new(Language::Python, source)
    }

    fn workspace(&self) -> Option<WorkspaceLayout> {
        None
    }

    fn command(
        &self,
        program: &WrappedProgram,
        _environment: Option<&ExecutionEnvironment>,
    ) -> Result<ProcessConfig> {
        Ok(ProcessConfig {
            program: self.interpreter.clone(),
            args: vec!["-c".to_string(), program.source().to_string()],
            env: vec![
                ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
                ("PYTHONDONTWRITEBYTECODE".to_string(), "1".to_string()),
            ],
            cwd: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> PythonAdapter {
        PythonAdapter::new("python3")
    }

    #[test]
    fn test_wrap_nests_body_in_async_main() {
        let program = adapter().wrap("x = 1\nprint(x)");
        let source = program.source();

        assert!(source.contains("async def main():\n    x = 1\n    print(x)\n"));
        assert!(source.contains("asyncio.run(main())"));
        assert_eq!(program.language(), Language::Python);
    }

    #[test]
    fn test_wrap_places_preamble_before_and_sentinel_after_body() {
        let source = adapter().wrap("print('body')").source().to_string();

        let preamble = source.find("mock_private_key = '").unwrap();
        let body = source.find("print('body')").unwrap();
        let sentinel = source.find(COMPLETION_SENTINEL).unwrap();

        assert!(preamble < body);
        assert!(body < sentinel);
        assert!(source.contains(PLACEHOLDER_PRIVATE_KEY));
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let a = adapter();
        assert_eq!(a.wrap("await asyncio.sleep(0)"), a.wrap("await asyncio.sleep(0)"));
    }

    #[test]
    fn test_wrap_empty_snippet_gets_pass() {
        let source = adapter().wrap("").source().to_string();
        assert!(source.contains("async def main():\n    pass\n"));
    }

    #[test]
    fn test_wrap_comment_only_snippet_gets_pass() {
        let source = adapter().wrap("# nothing here").source().to_string();
        assert!(source.contains("    # nothing here\n    pass\n"));
    }

    #[test]
    fn test_wrap_keeps_nested_indentation() {
        let source = adapter()
            .wrap("for i in range(2):\n    print(i)")
            .source()
            .to_string();
        assert!(source.contains("    for i in range(2):\n        print(i)\n"));
    }

    #[test]
    fn test_no_workspace_needed() {
        assert!(adapter().workspace().is_none());
    }

    #[test]
    fn test_command_passes_program_inline() {
        let a = adapter();
        let program = a.wrap("print(1)");
        let config = a.command(&program, None).unwrap();

        assert_eq!(config.program, PathBuf::from("python3"));
        assert_eq!(config.args[0], "-c");
        assert_eq!(config.args[1], program.source());
        assert!(config.cwd.is_none());
        assert!(config
            .env
            .iter()
            .any(|(k, v)| k == "PYTHONUNBUFFERED" && v == "1"));
    }
}
