//! Pipeline stages for writeup-to-PDF conversion.
//!
//! Each submodule implements exactly one step. The browser and pdfium sit
//! behind traits ([`engine::RenderEngine`], [`assemble::PdfAssembler`]) so
//! the stages around them can be tested without either installed.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ inline ──▶ html ──▶ render ──▶ assemble
//! (tree walk)  (data URLs) (cmark) (Chromium)  (pdfium)
//!                                    ▲
//!                        index ──────┘
//! ```
//!
//! 1. [`discover`] — find `category/challenge/README.md` items
//! 2. [`inline`]   — embed local images as `data:` URLs via [`encode`]
//! 3. [`html`]     — markdown to a styled standalone HTML document
//! 4. [`render`]   — HTML temp file to PDF through the [`engine`]
//! 5. [`index`]    — the summary document, rendered the same way
//! 6. [`assemble`] — optional concatenation with separator pages; runs in
//!    `spawn_blocking` because pdfium is not async

pub mod assemble;
pub mod discover;
pub mod encode;
pub mod engine;
pub mod html;
pub mod index;
pub mod inline;
pub mod render;
