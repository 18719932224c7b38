//! Diagnostics HUD: render status, recent events, GL info and a LAN share QR.

use crate::render::js_value_to_string;
use qrcodegen::{QrCode, QrCodeEcc};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement, HtmlDivElement,
    HtmlElement, HtmlImageElement, Location,
};

const QR_SIZE_PX: u32 = 176;
const USER_AGENT_MAX: usize = 120;

pub fn set_status(document: &Document, diagnostics_text: Option<&HtmlElement>, status: &str, message: &str) {
    if let Some(el) = document.document_element() {
        let _ = el.set_attribute("data-render-status", status);
    }
    if let Some(text) = diagnostics_text {
        text.set_text_content(Some(message));
    }
}

/// How the mascot came out of startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MascotStart {
    Running,
    Disabled,
    NoContainer,
    Failed,
}

/// `data-render-status` value and HUD message once startup has finished.
/// Only a mascot that failed to start degrades the page.
pub fn startup_status(mascot: MascotStart) -> (&'static str, &'static str) {
    match mascot {
        MascotStart::Failed => ("degraded", "Mascot unavailable; page effects running"),
        MascotStart::Running | MascotStart::Disabled | MascotStart::NoContainer => {
            ("ready", "Running")
        }
    }
}

pub fn render_qr_data_url(document: &Document, payload: &str, size_px: u32) -> Result<String, JsValue> {
    let qr = QrCode::encode_text(payload, QrCodeEcc::Medium)
        .map_err(|_| JsValue::from_str("failed to encode LAN QR payload"))?;
    let qr_size = qr.size();
    let border_modules = 2i32;
    let total_modules = qr_size + border_modules * 2;

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(size_px);
    canvas.set_height(size_px);

    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D canvas unavailable for LAN QR"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    context.set_image_smoothing_enabled(false);

    let size = size_px as f64;
    context.set_fill_style_str("#f8fcff");
    context.fill_rect(0.0, 0.0, size, size);

    context.set_fill_style_str("#0a1018");
    let module_px = size / total_modules as f64;

    for y in 0..qr_size {
        for x in 0..qr_size {
            if !qr.get_module(x, y) {
                continue;
            }

            let x0 = ((x + border_modules) as f64 * module_px).floor();
            let y0 = ((y + border_modules) as f64 * module_px).floor();
            let x1 = ((x + border_modules + 1) as f64 * module_px).ceil();
            let y1 = ((y + border_modules + 1) as f64 * module_px).ceil();
            context.fill_rect(x0, y0, (x1 - x0).max(1.0), (y1 - y0).max(1.0));
        }
    }

    canvas.to_data_url_with_type("image/png")
}

/// Loopback hosts cannot be opened from a phone on the same network.
pub fn is_loopback_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]"
}

struct LanShare {
    panel: HtmlDivElement,
    qr: HtmlImageElement,
    url: HtmlElement,
}

pub struct Diagnostics {
    document: Document,
    panel: HtmlDivElement,
    text: HtmlElement,
    tools_button: Option<HtmlButtonElement>,
    lan_share: Option<LanShare>,
    open: bool,
    user_agent: String,
}

impl Diagnostics {
    /// `None` when the page has no diagnostics panel.
    pub fn attach(document: &Document, user_agent: String) -> Option<Self> {
        let panel = document
            .get_element_by_id("diagnostics")?
            .dyn_into::<HtmlDivElement>()
            .ok()?;
        let text = document
            .get_element_by_id("diagnostics-text")?
            .dyn_into::<HtmlElement>()
            .ok()?;
        let tools_button = document
            .get_element_by_id("tools-button")
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());

        let lan_share = (|| {
            Some(LanShare {
                panel: document
                    .get_element_by_id("lan-share")?
                    .dyn_into::<HtmlDivElement>()
                    .ok()?,
                qr: document
                    .get_element_by_id("lan-qr")?
                    .dyn_into::<HtmlImageElement>()
                    .ok()?,
                url: document
                    .get_element_by_id("lan-url")?
                    .dyn_into::<HtmlElement>()
                    .ok()?,
            })
        })();

        Some(Self {
            document: document.clone(),
            panel,
            text,
            tools_button,
            lan_share,
            open: false,
            user_agent,
        })
    }

    pub fn tools_button(&self) -> Option<&HtmlButtonElement> {
        self.tools_button.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_status(&self, status: &str, message: &str) {
        set_status(&self.document, Some(&self.text), status, message);
    }

    pub fn status(&self) -> String {
        self.document
            .document_element()
            .and_then(|el| el.get_attribute("data-render-status"))
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;

        if let Some(el) = self.document.document_element() {
            let _ = el.set_attribute("data-diag-open", if open { "1" } else { "0" });
        }

        if let Some(button) = &self.tools_button {
            let _ = button.set_attribute("aria-expanded", if open { "true" } else { "false" });
            let _ = button.set_attribute("aria-pressed", if open { "true" } else { "false" });
            let _ = button.set_attribute(
                "title",
                if open {
                    "Hide diagnostics"
                } else {
                    "Diagnostics"
                },
            );
        }
        let _ = self
            .panel
            .set_attribute("aria-hidden", if open { "false" } else { "true" });
    }

    pub fn user_agent_line(&self) -> String {
        if self.user_agent.is_empty() {
            return "(unavailable)".to_string();
        }
        self.user_agent.chars().take(USER_AGENT_MAX).collect()
    }

    /// Replaces the panel text. Skipped while the panel is closed.
    pub fn show(&self, lines: &[String]) {
        if !self.open {
            return;
        }
        self.text.set_text_content(Some(&lines.join("\n")));
    }

    pub fn update_lan_share_qr(&self, location: &Location) -> Result<(), JsValue> {
        let Some(share) = &self.lan_share else {
            return Ok(());
        };
        let share_url = location.href()?;
        let host = location.hostname().unwrap_or_default();

        let mut label = share_url.clone();
        if is_loopback_host(&host) {
            label.push_str(" (loopback host; open via LAN IP to share)");
        }

        if share.qr.get_attribute("data-qr-payload").as_deref() != Some(share_url.as_str()) {
            match render_qr_data_url(&self.document, &share_url, QR_SIZE_PX) {
                Ok(qr_data_url) => {
                    share.qr.set_src(&qr_data_url);
                    let _ = share.qr.set_attribute("data-qr-payload", &share_url);
                }
                Err(err) => {
                    label.push_str("\nQR unavailable: ");
                    label.push_str(&js_value_to_string(&err));
                }
            }
        }

        share.url.set_text_content(Some(&label));
        let _ = share.panel.remove_attribute("hidden");
        Ok(())
    }
}
