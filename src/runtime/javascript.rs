//! JavaScript runtime (also serves "typescript", executed without type stripping)
//!
//! Node resolves `require` relative to the script's directory, so programs
//! run from an ephemeral workspace that links the shared `node_modules`.

use super::{
    indent_body, Manifest, RuntimeAdapter, WorkspaceLayout, WrappedProgram, COMPLETION_SENTINEL,
    PLACEHOLDER_PRIVATE_KEY,
};
use crate::environment::ExecutionEnvironment;
use crate::errors::{PlaygroundError, Result};
use crate::execution::ProcessConfig;
use crate::language::Language;
use std::path::PathBuf;

const BODY_INDENT: &str = "  ";
const ENTRY_FILE: &str = "script.js";
const DEPENDENCY_LINK: &str = "node_modules";
const PACKAGE_MANIFEST: Manifest = Manifest {
    file_name: "package.json",
    contents: r#"{"type": "commonjs"}"#,
};

/// A `const <bindings> = require('<module>');` line in the preamble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImport {
    pub bindings: String,
    pub module: String,
}

impl ModuleImport {
    pub fn new(bindings: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            bindings: bindings.into(),
            module: module.into(),
        }
    }

    /// Imports provided by the stock dependency root
    pub fn defaults() -> Vec<ModuleImport> {
        vec![
            ModuleImport::new("{ ethers }", "ethers"),
            ModuleImport::new("{ createClient, Annotation, Tagged }", "golem-base-sdk"),
        ]
    }

    fn render(&self) -> String {
        format!("const {} = require('{}');", self.bindings, self.module)
    }
}

#[derive(Debug, Clone)]
pub struct JavaScriptAdapter {
    interpreter: PathBuf,
    dependency_root: PathBuf,
    imports: Vec<ModuleImport>,
}

impl JavaScriptAdapter {
    pub fn new(interpreter: impl Into<PathBuf>, dependency_root: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            dependency_root: dependency_root.into(),
            imports: ModuleImport::defaults(),
        }
    }

    /// Replace the `require` lines emitted ahead of the snippet
    pub fn with_imports(mut self, imports: Vec<ModuleImport>) -> Self {
        self.imports = imports;
        self
    }
}

impl RuntimeAdapter for JavaScriptAdapter {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn wrap(&self, code: &str) -> WrappedProgram {
        let mut imports = self
            .imports
            .iter()
            .map(ModuleImport::render)
            .collect::<Vec<_>>()
            .join("\n");
        if !imports.is_empty() {
            imports.push_str("\n\n");
        }

        let source = format!(
            r#"{imports}// Playground credentials: read-only placeholder, not a real key
const mockPrivateKey = '{key}';
const mockPrivateKeyWithPrefix = '0x' + mockPrivateKey;

async function main() {{
{body}
}}

main().then(() => {{
  console.log('');
  console.log('{sentinel}');
}}).catch(error => {{
  console.error('❌ Error:', error instanceof Error ? error.message : error);
  process.exit(1);
}});
"#,
            imports = imports,
            key = PLACEHOLDER_PRIVATE_KEY,
            body = indent_body(code, BODY_INDENT),
            sentinel = COMPLETION_SENTINEL,
        );

        WrappedProgram::new(Language::JavaScript, source)
    }

    fn workspace(&self) -> Option<WorkspaceLayout> {
        Some(WorkspaceLayout {
            dependency_root: self.dependency_root.clone(),
            dependency_link: DEPENDENCY_LINK,
            manifest: Some(PACKAGE_MANIFEST),
            entry_file: ENTRY_FILE,
        })
    }

    fn command(
        &self,
        _program: &WrappedProgram,
        environment: Option<&ExecutionEnvironment>,
    ) -> Result<ProcessConfig> {
        let environment = environment.ok_or_else(|| {
            PlaygroundError::InvalidConfig(
                "javascript programs must run inside a workspace".to_string(),
            )
        })?;

        Ok(ProcessConfig {
            program: self.interpreter.clone(),
            args: vec![environment.entry_path().to_string_lossy().into_owned()],
            env: vec![("NODE_ENV".to_string(), "production".to_string())],
            cwd: Some(environment.path().to_path_buf()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> JavaScriptAdapter {
        JavaScriptAdapter::new("node", "/srv/js/node_modules")
    }

    #[test]
    fn test_wrap_nests_body_in_async_main() {
        let source = adapter()
            .wrap("const x = await Promise.resolve(2);\nconsole.log(x);")
            .source()
            .to_string();

        assert!(source.contains(
            "async function main() {\n  const x = await Promise.resolve(2);\n  console.log(x);\n}"
        ));
        assert!(source.contains("process.exit(1);"));
    }

    #[test]
    fn test_wrap_emits_default_imports_first() {
        let source = adapter().wrap("").source().to_string();
        assert!(source.starts_with("const { ethers } = require('ethers');\n"));
        assert!(source.contains("require('golem-base-sdk');"));
    }

    #[test]
    fn test_wrap_without_imports() {
        let source = adapter()
            .with_imports(Vec::new())
            .wrap("")
            .source()
            .to_string();
        assert!(source.starts_with("// Playground credentials"));
        assert!(!source.contains("require("));
    }

    #[test]
    fn test_wrap_preamble_and_sentinel_order() {
        let source = adapter().wrap("console.log('body');").source().to_string();

        let key = source.find(PLACEHOLDER_PRIVATE_KEY).unwrap();
        let body = source.find("console.log('body');").unwrap();
        let sentinel = source.find(COMPLETION_SENTINEL).unwrap();

        assert!(key < body);
        assert!(body < sentinel);
    }

    #[test]
    fn test_workspace_layout() {
        let layout = adapter().workspace().unwrap();
        assert_eq!(layout.dependency_root, PathBuf::from("/srv/js/node_modules"));
        assert_eq!(layout.dependency_link, "node_modules");
        assert_eq!(layout.entry_file, "script.js");
        let manifest = layout.manifest.unwrap();
        assert_eq!(manifest.file_name, "package.json");
        assert!(manifest.contents.contains("commonjs"));
    }

    #[test]
    fn test_command_requires_environment() {
        let a = adapter();
        let program = a.wrap("1");
        assert!(matches!(
            a.command(&program, None),
            Err(PlaygroundError::InvalidConfig(_))
        ));
    }
}
