use wasm_bindgen::prelude::*;

use crate::model::{LayoutOptions, ReportInput};

/// Render a report from its JSON form. `options_json` may be empty for the
/// defaults.
#[wasm_bindgen]
pub fn render_pdf(json: &str, options_json: &str) -> Result<Vec<u8>, JsValue> {
    let options = (!options_json.trim().is_empty()).then_some(options_json);
    crate::render_json(json, options).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render a report passed as plain JS objects, as a form would build them.
#[wasm_bindgen(js_name = renderPdfValue)]
pub fn render_pdf_value(input: JsValue, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let input: ReportInput = serde_wasm_bindgen::from_value(input)?;
    let options: LayoutOptions = if options.is_undefined() || options.is_null() {
        LayoutOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    crate::render(&input, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The download name for a report on `site`.
#[wasm_bindgen(js_name = outputFileName)]
pub fn output_file_name(site: &str) -> String {
    crate::output_file_name(site)
}

/// Webmail compose link for a report passed as JSON.
#[wasm_bindgen(js_name = composeMailUrl)]
pub fn compose_mail_url(json: &str, options_json: &str) -> Result<String, JsValue> {
    let input: ReportInput =
        serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let options = (!options_json.trim().is_empty()).then_some(options_json);
    let options = crate::parse_options(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(crate::mail::compose_url(&input, &options))
}
