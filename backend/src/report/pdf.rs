use image::DynamicImage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};

use super::ReportDocument;

pub const REPORT_FILENAME: &str = "poultry_report.pdf";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const IMAGE_MAX_WIDTH: f32 = 90.0;
const IMAGE_MAX_HEIGHT: f32 = 90.0;
const MAX_EMBED_PIXELS: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to load report image: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

/// Renders A4 diagnosis reports with printpdf's built-in fonts.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportError> {
        let image = image::open(&document.image_path)?;

        let (doc, page, layer) = PdfDocument::new(
            "Poultry Disease Detection Report",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Report",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ReportError::Pdf(format!("{:?}", e)))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ReportError::Pdf(format!("{:?}", e)))?,
        };

        let mut y = PAGE_HEIGHT - MARGIN;
        layer.use_text("Poultry Disease Detection Report", 20.0, Mm(MARGIN), Mm(y), &fonts.bold);
        y -= 10.0;
        layer.use_text(
            format!("Generated: {}", document.timestamp()),
            10.0,
            Mm(MARGIN),
            Mm(y),
            &fonts.regular,
        );

        y -= 14.0;
        let prediction = &document.prediction;
        layer.use_text(
            format!("Prediction: {}", prediction.label),
            14.0,
            Mm(MARGIN),
            Mm(y),
            &fonts.bold,
        );
        y -= 8.0;
        layer.use_text(
            format!("Confidence: {}%", prediction.confidence),
            12.0,
            Mm(MARGIN),
            Mm(y),
            &fonts.regular,
        );

        y -= 8.0;
        y = place_image(&layer, &image, y);

        if let Some(info) = prediction.label.info() {
            y -= 12.0;
            layer.use_text("Disease reference", 13.0, Mm(MARGIN), Mm(y), &fonts.bold);
            for (heading, text) in [
                ("Symptoms", info.symptoms),
                ("Treatment", info.treatment),
                ("Management", info.management),
            ] {
                y -= 7.0;
                layer.use_text(
                    format!("{}: {}", heading, text),
                    11.0,
                    Mm(MARGIN),
                    Mm(y),
                    &fonts.regular,
                );
            }
        }

        layer.use_text(
            "This report is generated automatically. Confirm any diagnosis with a veterinarian.",
            8.0,
            Mm(MARGIN),
            Mm(MARGIN),
            &fonts.regular,
        );

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ReportError::Pdf(format!("{:?}", e)))?;
        log::info!(
            "Rendered report for {} ({} bytes)",
            document.image_path.display(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Draws the image below `top` and returns the y coordinate of its bottom edge.
fn place_image(layer: &PdfLayerReference, image: &DynamicImage, top: f32) -> f32 {
    let image = image.thumbnail(MAX_EMBED_PIXELS, MAX_EMBED_PIXELS);
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let (width_px, height_px) = (rgb.width() as f32, rgb.height() as f32);

    let scale = (IMAGE_MAX_WIDTH / width_px).min(IMAGE_MAX_HEIGHT / height_px);
    let height_mm = height_px * scale;
    // printpdf sizes images by dpi: 25.4 mm per inch
    let dpi = 25.4 / scale;
    let bottom = top - height_mm;

    Image::from_dynamic_image(&rgb).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(bottom)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    bottom
}
