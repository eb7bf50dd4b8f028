use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

use base64::{engine::general_purpose, Engine as _};
use eframe::egui;
use image::DynamicImage;

use crate::api::{AnalysisResult, ApiClient};
use crate::overlay::BoxOverlay;
use crate::presentation;
use crate::upload::{self, ValidatedImage};
use crate::workflow::{Command, Event, RequestToken, Workflow, WorkflowState};

const BOX_STROKE: egui::Color32 = egui::Color32::from_rgb(0xf4, 0x43, 0x36);
const NOTICE_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x98, 0x00);
const PREVIEW_MAX_HEIGHT: f32 = 480.0;

type NetMessage = (RequestToken, Result<AnalysisResult, String>);

// ── Preview ─────────────────────────────────────────────────────────────────

/// Decoded pixels of a displayable image plus its lazily-uploaded texture.
/// Dropping a preview releases the texture along with it.
pub struct Preview {
    raw: DynamicImage,
    natural: (f32, f32),
    texture: Option<egui::TextureHandle>,
}

impl Preview {
    fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let raw = image::load_from_memory(bytes)?;
        let natural = (raw.width() as f32, raw.height() as f32);
        Ok(Self {
            raw,
            natural,
            texture: None,
        })
    }

    fn ensure_texture(&mut self, ctx: &egui::Context, name: &str) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.raw.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR));
    }
}

fn decode_annotated(b64: &str) -> Result<Preview, String> {
    let bytes = general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| format!("invalid base64 payload: {e}"))?;
    Preview::decode(&bytes).map_err(|e| format!("invalid image payload: {e}"))
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct DamageCheckApp {
    workflow: Workflow<Preview>,
    overlay: BoxOverlay,
    // Server-annotated fallback, shown only when the result carries no boxes.
    annotated: Option<Preview>,
    client: ApiClient,
    net_tx: Sender<NetMessage>,
    net_rx: Receiver<NetMessage>,
    // Intake rejections; displayed without touching the workflow state.
    notice: Option<String>,
}

impl DamageCheckApp {
    pub fn new(endpoint: String) -> Self {
        let (net_tx, net_rx) = channel();
        Self {
            workflow: Workflow::new(),
            overlay: BoxOverlay::new(),
            annotated: None,
            client: ApiClient::new(endpoint),
            net_tx,
            net_rx,
            notice: None,
        }
    }

    fn select_path(&mut self, path: &Path) {
        if self.workflow.is_analyzing() {
            return;
        }
        match upload::read_image(path) {
            Ok(image) => match Preview::decode(&image.bytes) {
                Ok(preview) => {
                    self.workflow.handle(Event::SelectImage { image, preview });
                    self.overlay.clear();
                    self.annotated = None;
                    self.notice = None;
                }
                Err(err) => {
                    log::warn!("could not decode {}: {err}", path.display());
                    self.notice = Some(format!("Could not decode image: {err}"));
                }
            },
            Err(err) => {
                log::warn!("rejected {}: {err}", path.display());
                self.notice = Some(err.to_string());
            }
        }
    }

    fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp"])
            .pick_file();
        if let Some(path) = picked {
            self.select_path(&path);
        }
    }

    fn reset(&mut self) {
        self.workflow.handle(Event::Reset);
        self.overlay.clear();
        self.annotated = None;
        self.notice = None;
    }

    fn start_analysis(&self, image: ValidatedImage, token: RequestToken, ctx: egui::Context) {
        let client = self.client.clone();
        let tx = self.net_tx.clone();
        std::thread::spawn(move || {
            let outcome = client.assess(&image).map_err(|err| {
                log::error!("analysis request {token} failed: {err}");
                err.user_message()
            });
            let _ = tx.send((token, outcome));
            ctx.request_repaint();
        });
    }

    fn drain_network(&mut self) {
        let mut finished_any = false;
        while let Ok((token, outcome)) = self.net_rx.try_recv() {
            self.workflow.handle(Event::Finished { token, outcome });
            finished_any = true;
        }
        if finished_any {
            self.sync_result_display();
        }
    }

    // Exactly one of {boxes over the original, annotated image, plain
    // preview} may be displayed for a result.
    fn sync_result_display(&mut self) {
        self.overlay.clear();
        self.annotated = None;
        let Some(result) = self.workflow.result() else {
            return;
        };
        if !result.boxes().is_empty() {
            self.overlay.set_boxes(result.boxes().to_vec());
        } else if let Some(b64) = &result.annotated_image_base64 {
            match decode_annotated(b64) {
                Ok(preview) => self.annotated = Some(preview),
                Err(err) => log::warn!("ignoring annotated image: {err}"),
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let path = dropped.into_iter().find_map(|f| f.path);
        if let Some(path) = path {
            self.select_path(&path);
        }
    }

    // ── Screens ────────────────────────────────────────────────────────

    fn show_upload_prompt(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.heading("Upload Vehicle Image");
            ui.label("Drag & drop an image onto the window, or browse below.");
            ui.label("Supported formats: JPEG, PNG, WebP (Max 10MB)");
            ui.add_space(16.0);
            if ui.button("📸 Choose image…").clicked() {
                self.pick_file();
            }
            if let Some(notice) = &self.notice {
                ui.add_space(16.0);
                ui.colored_label(NOTICE_COLOR, notice);
            }
        });
    }

    fn show_analysis_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Selected Image");
        ui.add_space(4.0);
        self.show_preview_image(ui);
        ui.add_space(8.0);

        let analyzing = self.workflow.is_analyzing();
        let can_analyze = matches!(self.workflow.state(), WorkflowState::ImageSelected { .. });
        let mut start = None;
        let mut reset = false;
        ui.horizontal(|ui| {
            let analyze = ui.add_enabled(can_analyze, egui::Button::new("🔍 Analyze Damage"));
            if analyze.clicked() {
                start = self.workflow.handle(Event::Analyze);
            }
            // Reset stays available mid-analysis; the in-flight answer is
            // discarded by the request-token check when it lands.
            if ui.button("🔄 Upload New Image").clicked() {
                reset = true;
            }
        });
        if reset {
            self.reset();
            return;
        }
        if let Some(Command::StartAnalysis { image, token }) = start {
            self.start_analysis(image, token, ui.ctx().clone());
        }

        if analyzing {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Analyzing image…");
            });
        }

        if let Some(notice) = &self.notice {
            ui.add_space(8.0);
            ui.colored_label(NOTICE_COLOR, notice);
        }

        if let Some(error) = self.workflow.error() {
            ui.add_space(8.0);
            ui.colored_label(BOX_STROKE, format!("⚠ {error}"));
        }

        if let Some(result) = self.workflow.result() {
            ui.add_space(12.0);
            presentation::show_results(ui, result);
        }
    }

    fn show_preview_image(&mut self, ui: &mut egui::Ui) {
        let (texture, natural, with_overlay) = if let Some(annotated) = &self.annotated {
            (annotated.texture.as_ref(), annotated.natural, false)
        } else if let Some(preview) = self.workflow.preview() {
            (preview.texture.as_ref(), preview.natural, true)
        } else {
            return;
        };
        let Some(texture) = texture else {
            return;
        };

        let max = egui::vec2(ui.available_width(), PREVIEW_MAX_HEIGHT);
        let response = ui.add(egui::Image::new(texture).max_size(max));
        let image_rect = response.rect;

        if !with_overlay {
            return;
        }

        // Both the load of a new image and any later resize of the window
        // land here as a metrics change.
        self.overlay
            .observe(natural, (image_rect.width(), image_rect.height()));

        // Out-of-range boxes are clipped against the image area, never
        // rejected by the mapper.
        let painter = ui.painter().with_clip_rect(image_rect);
        for rect in self.overlay.projected() {
            let screen = egui::Rect::from_min_size(
                image_rect.min + egui::vec2(rect.left as f32, rect.top as f32),
                egui::vec2(rect.width as f32, rect.height as f32),
            );
            painter.rect_stroke(
                screen,
                0.0,
                egui::Stroke::new(2.0, BOX_STROKE),
                egui::StrokeKind::Middle,
            );
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for DamageCheckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_network();
        self.handle_dropped_files(ctx);

        if let Some(preview) = self.workflow.preview_mut() {
            preview.ensure_texture(ctx, "preview");
        }
        if let Some(annotated) = &mut self.annotated {
            annotated.ensure_texture(ctx, "annotated");
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("🚗 Vehicle Damage Assessment");
                ui.label("AI-Powered Damage Detection & Analysis");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if matches!(self.workflow.state(), WorkflowState::Idle) {
                    self.show_upload_prompt(ui);
                } else {
                    self.show_analysis_section(ui);
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_payload_decodes_to_a_preview() {
        let mut png = Vec::new();
        let img = image::DynamicImage::new_rgba8(4, 2);
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let b64 = general_purpose::STANDARD.encode(&png);

        let preview = decode_annotated(&b64).unwrap();
        assert_eq!(preview.natural, (4.0, 2.0));
        assert!(preview.texture.is_none());
    }

    #[test]
    fn bad_annotated_payloads_are_rejected_not_fatal() {
        assert!(decode_annotated("%%%not-base64%%%").is_err());
        let b64 = general_purpose::STANDARD.encode(b"not an image");
        assert!(decode_annotated(&b64).is_err());
    }
}
