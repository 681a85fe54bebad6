//! Export pipeline: collect, render, deliver

use crate::config::{CaptureStrategy, ExportConfig, RasterOutput};
use crate::export::{Artifact, ArtifactKind, ExportSink};
use crate::field::collect_fields;
use crate::font::EmbeddedFont;
use crate::form::FormView;
use crate::notice::{Notice, ProgressNotice, StatusSurface};
use crate::position::PositionMap;
use crate::raster::{Rasterizer, SoftwareRasterizer};
use crate::render::{encode_raster, raster_to_pdf, DirectTextRenderer, RasterOverlayRenderer};
use crate::{ReceiptError, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Phase of the export in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Collecting,
    Rendering,
}

/// Result of one [`ExportPipeline::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported {
        filename: String,
        kind: ArtifactKind,
        size: usize,
    },
    Failed {
        reason: String,
    },
}

impl ExportOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self, ExportOutcome::Exported { .. })
    }
}

/// One configurable export pipeline
///
/// The capture strategy comes from the [`ExportConfig`] and the coordinates
/// from the [`PositionMap`]; template, background and font bytes are loaded
/// once and reused by every run.
pub struct ExportPipeline {
    config: ExportConfig,
    positions: PositionMap,
    template: Option<Vec<u8>>,
    background: Option<Vec<u8>>,
    font: Option<EmbeddedFont>,
    rasterizer: Box<dyn Rasterizer>,
    state: ExportState,
}

impl ExportPipeline {
    /// Pipeline without template, background or embedded font
    pub fn new(config: ExportConfig, positions: PositionMap) -> Self {
        Self {
            config,
            positions,
            template: None,
            background: None,
            font: None,
            rasterizer: Box::new(SoftwareRasterizer::new()),
            state: ExportState::Idle,
        }
    }

    /// Build a pipeline and load the files the configuration names
    ///
    /// Template and background files that cannot be read are logged and left
    /// out; exports then run degraded. A configured font must load.
    pub fn from_config(config: ExportConfig, positions: PositionMap) -> Result<Self> {
        config.validate()?;

        let template = config.template_path.as_deref().and_then(|p| read_optional(p, "template"));
        let background = config
            .background_path
            .as_deref()
            .and_then(|p| read_optional(p, "background"));
        let font = config.font.as_ref().map(EmbeddedFont::load).transpose()?;

        let mut pipeline = Self::new(config, positions);
        pipeline.template = template;
        pipeline.background = background;
        if let Some(font) = font {
            pipeline = pipeline.with_font(font)?;
        }
        Ok(pipeline)
    }

    pub fn with_template(mut self, template: Vec<u8>) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_background(mut self, background: Vec<u8>) -> Self {
        self.background = Some(background);
        self
    }

    /// Use an embedded family for PDF text and for the software rasterizer
    pub fn with_font(mut self, font: EmbeddedFont) -> Result<Self> {
        self.rasterizer = Box::new(SoftwareRasterizer::with_font(&font)?);
        self.font = Some(font);
        Ok(self)
    }

    /// Replace the rasterizer
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Export the view and deliver the artifact to `sink`
    ///
    /// A progress notice is shown for the duration of the run. Failures never
    /// escape: they are logged, surfaced as an auto-dismissing error notice and
    /// reported in the outcome. The pipeline is `Idle` again on return.
    pub fn run(
        &mut self,
        view: &mut FormView,
        sink: &mut dyn ExportSink,
        surface: &mut dyn StatusSurface,
    ) -> ExportOutcome {
        let mut progress = ProgressNotice::show(surface, &self.config.notices.progress_message);

        let result = self.export(view).and_then(|artifact| {
            sink.deliver(&artifact)?;
            Ok(artifact)
        });
        transition(&mut self.state, ExportState::Idle);

        match result {
            Ok(artifact) => {
                info!(
                    filename = %artifact.filename,
                    kind = ?artifact.kind,
                    bytes = artifact.bytes.len(),
                    "export finished"
                );
                ExportOutcome::Exported {
                    filename: artifact.filename,
                    kind: artifact.kind,
                    size: artifact.bytes.len(),
                }
            }
            Err(e) => {
                error!(error = %e, "export failed");
                let notices = &self.config.notices;
                progress.surface().show(Notice::error(
                    &notices.error_message,
                    Duration::from_millis(notices.error_dismiss_ms),
                ));
                ExportOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Produce the artifact for the configured strategy
    fn export(&mut self, view: &mut FormView) -> Result<Artifact> {
        transition(&mut self.state, ExportState::Collecting);
        let config = &self.config;
        let kind = config.artifact_kind();

        let bytes = match &config.strategy {
            CaptureStrategy::DirectText => {
                let values = collect_fields(view, &config.selector, &config.date_format);
                transition(&mut self.state, ExportState::Rendering);
                DirectTextRenderer::new(&self.positions)
                    .with_font(self.font.as_ref())
                    .render(self.template.as_deref(), &values)?
                    .into_bytes()?
            }
            CaptureStrategy::Rasterize(raster) => {
                transition(&mut self.state, ExportState::Rendering);
                // A composited background replaces the view's own
                let composited = matches!(
                    raster.output,
                    RasterOutput::Pdf {
                        composite_background: true
                    }
                );
                let renderer = RasterOverlayRenderer::new(
                    self.rasterizer.as_ref(),
                    &config.selector,
                    &config.date_format,
                )
                .with_options(raster.options())
                .hide_background(raster.hide_background || composited);
                let image = renderer.capture(view)?;

                match raster.output {
                    RasterOutput::Image { format } => encode_raster(&image, format)?,
                    RasterOutput::Pdf {
                        composite_background,
                    } => {
                        let background = if composite_background {
                            if self.background.is_none() {
                                warn!("no background loaded, composing raster alone");
                            }
                            self.background.as_deref()
                        } else {
                            None
                        };
                        raster_to_pdf(&image, self.positions.page_size(), background)?
                            .into_bytes()?
                    }
                }
            }
        };

        if bytes.is_empty() {
            return Err(ReceiptError::RenderError("empty output".to_string()));
        }
        Ok(Artifact::new(&config.filename, kind, bytes))
    }
}

fn transition(state: &mut ExportState, next: ExportState) {
    debug!(from = ?*state, to = ?next, "export state");
    *state = next;
}

fn read_optional(path: &Path, what: &str) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "{what} not loaded");
            None
        }
    }
}
