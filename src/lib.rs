//! Student ID cards: QR symbols, card markup, and print-ready PDF layout.

pub mod card;
pub mod colour;
pub mod print;
pub mod records;
pub mod symbol;
