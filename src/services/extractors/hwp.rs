// src/services/extractors/hwp.rs

//! HWP (OLE compound) extraction through external converters.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{Extractor, OverviewPolicy};
use crate::error::DocumentError;
use crate::models::{Config, ExtractionResult, Format};
use crate::services::converter::{CommandConverter, MarkupConverter};
use crate::utils::text::{Whitelist, normalize};

/// Runs a chain of converters until one yields text.
pub struct HwpExtractor {
    converters: Vec<Box<dyn MarkupConverter>>,
    timeout: Duration,
    policy: Arc<OverviewPolicy>,
}

impl HwpExtractor {
    pub fn new(
        converters: Vec<Box<dyn MarkupConverter>>,
        timeout: Duration,
        policy: Arc<OverviewPolicy>,
    ) -> Self {
        Self {
            converters,
            timeout,
            policy,
        }
    }

    /// XHTML conversion first, plain-text dump second.
    pub fn from_config(config: &Config, policy: Arc<OverviewPolicy>) -> Self {
        let extraction = &config.extraction;
        let staging = &extraction.staging_dir;
        Self::new(
            vec![
                Box::new(
                    CommandConverter::xhtml(extraction.primary_converter.clone())
                        .with_staging_root(staging.clone()),
                ),
                Box::new(
                    CommandConverter::plain_text(extraction.secondary_converter.clone())
                        .with_staging_root(staging.clone()),
                ),
            ],
            Duration::from_secs(extraction.converter_timeout_secs),
            policy,
        )
    }
}

#[async_trait]
impl Extractor for HwpExtractor {
    fn format(&self) -> Format {
        Format::Hwp
    }

    async fn extract(&self, path: &Path) -> ExtractionResult {
        let mut last_error: Option<DocumentError> = None;
        let mut produced_output = false;

        for converter in &self.converters {
            match converter.convert(path, self.timeout).await {
                Ok(markup) => {
                    produced_output = true;
                    let text = normalize(&markup.to_text(), Whitelist::Standard);
                    if !text.is_empty() {
                        log::info!(
                            "{}: {} chars via {}",
                            path.display(),
                            text.chars().count(),
                            converter.name()
                        );
                        return self.policy.located(text);
                    }
                    log::warn!("{} produced no text for {}", converter.name(), path.display());
                }
                Err(e) => {
                    log::warn!("{} failed for {}: {}", converter.name(), path.display(), e);
                    last_error = Some(e.into());
                }
            }
        }

        let error = match last_error {
            Some(error) if !produced_output => error,
            _ => DocumentError::ExtractionEmpty {
                path: path.to_path_buf(),
            },
        };
        ExtractionResult::failed(error)
    }
}
