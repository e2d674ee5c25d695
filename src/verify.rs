use anyhow::Result;
use tracing::{debug, info};

use crate::ocr::VisionClient;

const OCR_PROMPT: &str =
    "Extract the digits visible on the ID card (especially below the barcode).";

/// What a single strategy concluded about the uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Definitive: the image backs up the entered code.
    Match(String),
    /// Definitive: the image contradicts the entered code.
    Mismatch(String),
    /// This strategy could not read anything usable; try the next one.
    Inconclusive,
}

/// Final answer for the signup handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub verified: bool,
    pub reason: String,
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, image: &[u8], expected: &str) -> Result<Outcome>;
}

/// Ordered chain of verification strategies. The first definitive
/// outcome wins; `Inconclusive` falls through to the next strategy.
pub struct Verifier {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Verifier {
    /// The production chain: barcode first, vision/OCR fallback.
    pub fn new(vision: Box<dyn VisionClient>) -> Self {
        Self::with_strategies(vec![
            Box::new(BarcodeStrategy),
            Box::new(OcrStrategy::new(vision)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn verify(&self, image: &[u8], expected: &str) -> Result<Verdict> {
        for strategy in &self.strategies {
            match strategy.check(image, expected)? {
                Outcome::Match(reason) => {
                    info!("{}: verified ({reason})", strategy.name());
                    return Ok(Verdict {
                        verified: true,
                        reason,
                    });
                }
                Outcome::Mismatch(reason) => {
                    info!("{}: rejected ({reason})", strategy.name());
                    return Ok(Verdict {
                        verified: false,
                        reason,
                    });
                }
                Outcome::Inconclusive => {
                    debug!("{}: inconclusive, trying next strategy", strategy.name());
                }
            }
        }

        Ok(Verdict {
            verified: false,
            reason: "could not read a barcode or any text from the image".to_string(),
        })
    }
}

/// Scans the image for a machine-readable barcode. No barcode (or image
/// bytes we cannot decode at all) is inconclusive, not a rejection.
pub struct BarcodeStrategy;

impl Strategy for BarcodeStrategy {
    fn name(&self) -> &'static str {
        "barcode"
    }

    fn check(&self, image: &[u8], expected: &str) -> Result<Outcome> {
        let img = match image::load_from_memory(image) {
            Ok(img) => img.to_luma8(),
            Err(e) => {
                debug!("Could not decode image bytes: {e}");
                return Ok(Outcome::Inconclusive);
            }
        };

        let (width, height) = img.dimensions();
        let scanned = match rxing::helpers::detect_in_luma(img.into_raw(), height, width, None) {
            Ok(result) => result.getText().to_string(),
            Err(_) => return Ok(Outcome::Inconclusive),
        };

        if scanned == expected {
            Ok(Outcome::Match("barcode matched".to_string()))
        } else {
            Ok(Outcome::Mismatch(format!(
                "barcode mismatch (scanned {scanned})"
            )))
        }
    }
}

/// Fallback: ask the vision service to read the digits off the card and
/// check whether the entered code appears in the returned text. The
/// substring check is deliberately loose, mirroring what the service
/// can realistically promise about layout.
pub struct OcrStrategy {
    client: Box<dyn VisionClient>,
}

impl OcrStrategy {
    pub fn new(client: Box<dyn VisionClient>) -> Self {
        Self { client }
    }
}

impl Strategy for OcrStrategy {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn check(&self, image: &[u8], expected: &str) -> Result<Outcome> {
        let text = self.client.extract_text(image, OCR_PROMPT)?;

        if text.contains(expected) {
            Ok(Outcome::Match("OCR matched".to_string()))
        } else {
            Ok(Outcome::Mismatch("OCR found no matching code".to_string()))
        }
    }
}
