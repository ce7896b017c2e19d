//! Document templates, land charge (malkiyat) calculation and OCR intake.

pub mod malkiyat;
pub mod ocr;
pub mod templates;

pub use malkiyat::MalkiyatCalculation;
