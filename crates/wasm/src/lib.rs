//! WASM bindings for receipt-overlay
//!
//! This crate provides a JavaScript-friendly API for:
//! - Configuring the export (JSON config and position map)
//! - Loading the template raster, background and an embedded font
//! - Exporting a form layout, or plain field values, to PDF or image bytes
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { ReceiptExporter } from 'receipt-wasm';
//!
//! await init();
//!
//! const exporter = new ReceiptExporter();
//! exporter.setTemplate(new Uint8Array(await (await fetch('recipet-min.png')).arrayBuffer()));
//!
//! const result = exporter.exportValues({ ownerName: 'Ramesh Kumar', dateInput: '2025-08-20' });
//! if (result.ok) {
//!   download(new Blob([result.bytes], { type: result.mimeType }), result.filename);
//! }
//! for (const notice of result.notices) {
//!   showNotice(notice.message, notice.autoDismissMs);
//! }
//! ```

use receipt::{
    Artifact, EmbeddedFont, ExportConfig, ExportOutcome, ExportPipeline, FormView, MemorySink,
    Notice, NoticeId, NoticeLevel, PositionMap, StatusSurface,
};
use serde::Serialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Notice as handed to JavaScript
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoticeView {
    level: &'static str,
    message: String,
    auto_dismiss_ms: Option<u64>,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            level: match notice.level {
                NoticeLevel::Progress => "progress",
                NoticeLevel::Error => "error",
            },
            message: notice.message.clone(),
            auto_dismiss_ms: notice.auto_dismiss.map(|d| d.as_millis() as u64),
        }
    }
}

/// Records notices still shown when the export returns
#[derive(Default)]
struct NoticeLog {
    next_id: u64,
    shown: Vec<(NoticeId, Notice)>,
}

impl StatusSurface for NoticeLog {
    fn show(&mut self, notice: Notice) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.shown.push((id, notice));
        id
    }

    fn dismiss(&mut self, id: NoticeId) {
        self.shown.retain(|(shown, _)| *shown != id);
    }
}

/// Outcome of one export
#[wasm_bindgen]
pub struct ExportResult {
    artifact: Option<Artifact>,
    error: Option<String>,
    notices: Vec<NoticeView>,
}

#[wasm_bindgen]
impl ExportResult {
    /// Whether an artifact was produced
    #[wasm_bindgen(getter)]
    pub fn ok(&self) -> bool {
        self.artifact.is_some()
    }

    /// Download filename, empty on failure
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.artifact
            .as_ref()
            .map(|a| a.filename.clone())
            .unwrap_or_default()
    }

    /// MIME type of the artifact, empty on failure
    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.artifact
            .as_ref()
            .map(|a| a.kind.mime_type().to_string())
            .unwrap_or_default()
    }

    /// Artifact bytes (Uint8Array)
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> js_sys::Uint8Array {
        match &self.artifact {
            Some(artifact) => js_sys::Uint8Array::from(artifact.bytes.as_slice()),
            None => js_sys::Uint8Array::new_with_length(0),
        }
    }

    /// Failure reason
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }

    /// Notices to display: `{ level, message, autoDismissMs }`
    #[wasm_bindgen(getter)]
    pub fn notices(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.notices).unwrap_or(JsValue::NULL)
    }
}

/// Receipt exporter
#[wasm_bindgen]
pub struct ReceiptExporter {
    config: ExportConfig,
    positions: PositionMap,
    template: Option<Vec<u8>>,
    background: Option<Vec<u8>>,
    font: Option<EmbeddedFont>,
}

#[wasm_bindgen]
impl ReceiptExporter {
    /// Exporter for the land rent receipt (direct text, `keerai.pdf`)
    #[wasm_bindgen(constructor)]
    pub fn new() -> ReceiptExporter {
        ReceiptExporter {
            config: ExportConfig::land_rent(),
            positions: PositionMap::land_rent_receipt(),
            template: None,
            background: None,
            font: None,
        }
    }

    /// Create an exporter from JSON configuration
    ///
    /// @param configJson - Export configuration
    /// @param positionsJson - Position map; the land rent table when omitted
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(
        config_json: &str,
        positions_json: Option<String>,
    ) -> Result<ReceiptExporter, JsValue> {
        let config = ExportConfig::from_json(config_json).map_err(js_error)?;
        let positions = match positions_json {
            Some(json) => PositionMap::from_json(&json).map_err(js_error)?,
            None => PositionMap::land_rent_receipt(),
        };
        Ok(ReceiptExporter {
            config,
            positions,
            ..ReceiptExporter::new()
        })
    }

    /// Template raster drawn under direct text (PNG or JPEG bytes)
    #[wasm_bindgen(js_name = setTemplate)]
    pub fn set_template(&mut self, data: &[u8]) {
        self.template = Some(data.to_vec());
    }

    /// Background of the form view (PNG or JPEG bytes)
    ///
    /// Rasterized with the form; when the config composites the background
    /// under a PDF it is drawn there instead and left out of the raster.
    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&mut self, data: &[u8]) {
        self.background = Some(data.to_vec());
    }

    /// Load a TrueType family, usable by name in the position map
    ///
    /// @param family - Family name
    /// @param regular - Regular variant TTF bytes
    /// @param bold - Optional bold variant TTF bytes
    #[wasm_bindgen(js_name = loadFont)]
    pub fn load_font(
        &mut self,
        family: &str,
        regular: &[u8],
        bold: Option<Vec<u8>>,
    ) -> Result<(), JsValue> {
        let mut font = EmbeddedFont::new(family, regular.to_vec());
        if let Some(bold) = bold {
            font = font.with_bold(bold);
        }
        // Rejects bytes ab_glyph cannot parse
        receipt::SoftwareRasterizer::with_font(&font).map_err(js_error)?;
        self.font = Some(font);
        Ok(())
    }

    /// Export a form layout
    ///
    /// @param formJson - Form view JSON (size, background, elements)
    /// @returns ExportResult; export failures are reported there, not thrown
    pub fn export(&self, form_json: &str) -> Result<ExportResult, JsValue> {
        let mut view = FormView::from_json(form_json).map_err(js_error)?;
        if let Some(background) = &self.background {
            view.set_background_image(background.clone());
        }
        self.run(&mut view)
    }

    /// Export field values laid out by the position map
    ///
    /// @param values - Object mapping field id to value
    #[wasm_bindgen(js_name = exportValues)]
    pub fn export_values(&self, values: JsValue) -> Result<ExportResult, JsValue> {
        let values: BTreeMap<String, String> = serde_wasm_bindgen::from_value(values)?;
        let mut view = FormView::from_position_map(&self.positions, &self.config.selector);
        for (id, value) in &values {
            view.set_value(id, value);
        }
        self.run(&mut view)
    }

    fn pipeline(&self) -> Result<ExportPipeline, JsValue> {
        let mut pipeline = ExportPipeline::new(self.config.clone(), self.positions.clone());
        if let Some(template) = &self.template {
            pipeline = pipeline.with_template(template.clone());
        }
        if let Some(background) = &self.background {
            pipeline = pipeline.with_background(background.clone());
        }
        if let Some(font) = &self.font {
            pipeline = pipeline.with_font(font.clone()).map_err(js_error)?;
        }
        Ok(pipeline)
    }

    fn run(&self, view: &mut FormView) -> Result<ExportResult, JsValue> {
        let mut pipeline = self.pipeline()?;
        let mut sink = MemorySink::new();
        let mut log = NoticeLog::default();

        let outcome = pipeline.run(view, &mut sink, &mut log);
        let error = match outcome {
            ExportOutcome::Exported { .. } => None,
            ExportOutcome::Failed { reason } => {
                web_sys::console::error_1(&JsValue::from_str(&reason));
                Some(reason)
            }
        };

        Ok(ExportResult {
            artifact: sink.take().pop(),
            error,
            notices: log.shown.iter().map(|(_, n)| NoticeView::from(n)).collect(),
        })
    }
}

impl Default for ReceiptExporter {
    fn default() -> Self {
        Self::new()
    }
}
