//! Rendering delivery payloads
//!
//! The core only builds a [`DeliveryPayload`]; mounting it is up to a
//! [`Renderer`]. [`HtmlRenderer`] writes a host page embedding the payload in a
//! sandboxed `<iframe srcdoc>`.

use crate::assemble::DeliveryPayload;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while rendering
#[derive(Debug, Error)]
pub enum RenderError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Creates or updates an execution surface from a payload
pub trait Renderer {
    fn render(&mut self, payload: &DeliveryPayload) -> Result<(), RenderError>;
}

/// Writes host pages to any writer
pub struct HtmlRenderer<W> {
    writer: W,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl HtmlRenderer<File> {
    /// Render into a file, creating parent directories as needed
    pub fn create(path: &Path) -> Result<Self, RenderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> Renderer for HtmlRenderer<W> {
    fn render(&mut self, payload: &DeliveryPayload) -> Result<(), RenderError> {
        self.writer.write_all(host_page(payload).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Host page with the payload mounted in an iframe
pub fn host_page(payload: &DeliveryPayload) -> String {
    let mut iframe = String::from("<iframe scrolling=\"no\"");
    if !payload.sandbox_attributes.is_empty() {
        iframe.push_str(&format!(
            " sandbox=\"{}\"",
            escape_attribute(&payload.sandbox_attributes)
        ));
    }
    if let Some(name) = &payload.name {
        iframe.push_str(&format!(" name=\"{}\"", escape_attribute(name)));
    }
    iframe.push_str(&format!(
        " srcdoc=\"{}\"></iframe>",
        escape_attribute(&payload.to_document())
    ));

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n{}\n</body>\n</html>\n",
        iframe
    )
}

/// Escape text for a double-quoted attribute value
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
