// src/services/converter.rs

//! External format conversion.
//!
//! A converter turns a document into markup or plain text. Conversions run as child
//! processes bounded by a timeout, inside a private temporary directory that is removed on
//! every exit path.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::process::Command;

use crate::error::ConversionError;
use crate::models::ConverterCommand;

/// Kind of content a converter produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    Xhtml,
    PlainText,
}

/// Raw converter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMarkup {
    pub kind: MarkupKind,
    pub content: String,
}

impl ExtractedMarkup {
    /// Text content, one text node per line for markup.
    pub fn to_text(&self) -> String {
        match self.kind {
            MarkupKind::PlainText => self.content.clone(),
            MarkupKind::Xhtml => xhtml_text(&self.content),
        }
    }
}

/// Text nodes of the document body, trimmed and joined by newlines.
fn xhtml_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    let nodes: Vec<&str> = match body {
        Some(body) => body.text().collect(),
        None => document.root_element().text().collect(),
    };

    nodes
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Capability: convert a document into markup.
#[async_trait]
pub trait MarkupConverter: Send + Sync {
    /// Program name for logs and errors.
    fn name(&self) -> &str;

    async fn convert(
        &self,
        path: &Path,
        timeout: Duration,
    ) -> Result<ExtractedMarkup, ConversionError>;
}

/// Where a command converter leaves its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterOutput {
    /// A file with this name inside the `{output}` directory
    File { name: String, kind: MarkupKind },
    /// Plain text on stdout
    Stdout,
}

/// Converter backed by an external command line tool.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    command: ConverterCommand,
    output: ConverterOutput,
    staging_root: Option<PathBuf>,
}

impl CommandConverter {
    pub fn new(command: ConverterCommand, output: ConverterOutput) -> Self {
        Self {
            command,
            output,
            staging_root: None,
        }
    }

    /// Create staging directories under `root` instead of the system temp dir.
    pub fn with_staging_root(mut self, root: Option<PathBuf>) -> Self {
        self.staging_root = root;
        self
    }

    /// `hwp5html`-style converter writing `index.xhtml`.
    pub fn xhtml(command: ConverterCommand) -> Self {
        Self::new(
            command,
            ConverterOutput::File {
                name: "index.xhtml".to_string(),
                kind: MarkupKind::Xhtml,
            },
        )
    }

    /// `hwp5txt`-style converter printing plain text.
    pub fn plain_text(command: ConverterCommand) -> Self {
        Self::new(command, ConverterOutput::Stdout)
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.command
            .args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }

    /// Copy the source under a short ASCII name; converters mishandle long Korean paths.
    async fn stage(&self, source: &Path, staging: &Path) -> Result<PathBuf, ConversionError> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_ascii_lowercase();
        let staged = staging.join(format!("source.{ext}"));
        tokio::fs::copy(source, &staged).await?;
        Ok(staged)
    }
}

#[async_trait]
impl MarkupConverter for CommandConverter {
    fn name(&self) -> &str {
        &self.command.program
    }

    async fn convert(
        &self,
        path: &Path,
        timeout: Duration,
    ) -> Result<ExtractedMarkup, ConversionError> {
        let program = self.command.program.clone();

        // Dropped on every return below, removing staged input and converter output
        let mut builder = tempfile::Builder::new();
        builder.prefix("ntis-conv-");
        let staging = match &self.staging_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let input = self.stage(path, staging.path()).await?;
        let out_dir = staging.path().join("out");
        tokio::fs::create_dir_all(&out_dir).await?;

        log::debug!("Running {} on {}", program, path.display());

        let child = Command::new(&program)
            .args(self.args(&input, &out_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ConversionError::Timeout {
                    program,
                    secs: timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::Exit {
                program,
                status: output.status.to_string(),
                stderr: stderr.trim().chars().take(500).collect(),
            });
        }

        match &self.output {
            ConverterOutput::Stdout => Ok(ExtractedMarkup {
                kind: MarkupKind::PlainText,
                content: String::from_utf8_lossy(&output.stdout).into_owned(),
            }),
            ConverterOutput::File { name, kind } => {
                let result_path = out_dir.join(name);
                match tokio::fs::read(&result_path).await {
                    Ok(bytes) => Ok(ExtractedMarkup {
                        kind: *kind,
                        content: String::from_utf8_lossy(&bytes).into_owned(),
                    }),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(ConversionError::MissingOutput {
                            program,
                            path: result_path,
                        })
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}
