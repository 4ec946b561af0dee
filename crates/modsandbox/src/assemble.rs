//! Script assembly
//!
//! Turns merged bundle text plus the entry source into the payload handed to a
//! renderer.

use crate::config::SandboxConfig;
use crate::specifier::encode_component;
use serde::Serialize;

/// Style reset applied to every execution surface
pub const BASE_STYLE: &str = "html, body { margin: 0; padding: 0; border: 0; }\n";

const CLOSING_SCRIPT_TAG: &str = "</script>";

/// How the script is embedded in the body markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEncoding {
    /// `<script>…</script>`
    Inline,
    /// `<script src="data:text/javascript;…">`
    DataUri,
}

/// Everything a renderer needs to build the execution surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    /// Head markup (configured head plus style block)
    pub head: String,

    /// Body markup ending with the script tag
    pub body: String,

    /// Wrapped script text
    pub script: String,

    /// Value for the surface's `sandbox` attribute
    pub sandbox_attributes: String,

    /// Surface name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Encoding chosen for the script tag
    #[serde(skip)]
    pub encoding: ScriptEncoding,
}

impl DeliveryPayload {
    /// Standalone HTML document for the surface
    pub fn to_document(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
            self.head, self.body
        )
    }
}

/// Builds delivery payloads from a fixed surface configuration
#[derive(Debug, Clone)]
pub struct ScriptAssembler {
    head: String,
    body: String,
    sandbox_attributes: String,
    name: Option<String>,
}

impl ScriptAssembler {
    pub fn from_config(config: &SandboxConfig) -> Self {
        Self {
            head: format!("{}{}", config.head, style_block(&config.style)),
            body: config.body.clone(),
            sandbox_attributes: config.sandbox_attributes.clone(),
            name: config.name.clone(),
        }
    }

    /// Assemble `bundle_text + entry` into a payload
    pub fn assemble(&self, bundle_text: &str, entry: &str) -> DeliveryPayload {
        let script = wrap_deferred(&format!("{}{}", bundle_text, entry));
        let (tag, encoding) = script_tag(&script);

        DeliveryPayload {
            head: self.head.clone(),
            body: format!("{}{}", self.body, tag),
            script,
            sandbox_attributes: self.sandbox_attributes.clone(),
            name: self.name.clone(),
            encoding,
        }
    }
}

impl Default for ScriptAssembler {
    fn default() -> Self {
        Self::from_config(&SandboxConfig::default())
    }
}

/// `<style>` block with the base reset followed by user styles
pub fn style_block(style: &str) -> String {
    format!("<style type='text/css'>{}{}</style>", BASE_STYLE, style)
}

/// Defer execution by one tick
///
/// Freshly attached frames report a wrong viewport size until the next tick.
pub fn wrap_deferred(script: &str) -> String {
    format!("setTimeout(function(){{\n;{}\n;}}, 0)", script)
}

/// Build the script tag for a wrapped script
///
/// A script containing `</script>` would end the host tag early, so it is
/// shipped as a percent-encoded data URI instead of inline.
pub fn script_tag(script: &str) -> (String, ScriptEncoding) {
    if script.contains(CLOSING_SCRIPT_TAG) {
        let tag = format!(
            "<script type=\"text/javascript\" src=\"data:text/javascript;charset=UTF-8,{}\"></script>",
            encode_component(script)
        );
        (tag, ScriptEncoding::DataUri)
    } else {
        let tag = format!("<script type=\"text/javascript\">{}</script>", script);
        (tag, ScriptEncoding::Inline)
    }
}
