//! Sealing of exercise solutions and presenter notes in LectureDoc pages.

pub mod crypto;
pub mod document;
pub mod error;
pub mod manifest;
pub mod render;
pub mod tracker;

pub use crate::{
    document::{Document, Node},
    error::{BlockKind, CryptoError, Error, StructuralError},
    manifest::{ManifestEntry, PasswordManifest},
    render::{RenderSettings, RenderedDocument, render_document},
    tracker::{BlockTracker, SealableBlock},
};
