//! Error Types
//!
//! This module defines the error types used throughout the converter.
//!
//! # Overview
//!
//! The main error type [`RetargetError`] covers every fatal failure mode:
//! - Malformed skeletons (zero or several root bones)
//! - Humanoid classification failures ([`ClassifierError`])
//! - BVH parsing errors
//! - glTF / VRMA encoding and decoding errors
//!
//! Non-fatal structural surprises are not errors; they are reported as
//! [`crate::humanoid::StructuralWarning`] values alongside a successful result.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, RetargetError>`.
//!
//! ```rust,ignore
//! use vrma::errors::{RetargetError, Result};
//!
//! fn convert_file(text: &str) -> Result<Vec<u8>> {
//!     vrma::convert_bvh(text, &Default::default())
//! }
//! ```

use thiserror::Error;

use crate::humanoid::HumanBoneName;

/// The main error type for the conversion pipeline.
#[derive(Error, Debug)]
pub enum RetargetError {
    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// The bone set does not have exactly one root bone.
    #[error("Invalid skeleton: expected exactly one root bone, found {roots}")]
    InvalidSkeleton {
        /// Number of bones whose parent lies outside the bone set
        roots: usize,
    },

    /// A required humanoid role could not be located.
    #[error("Humanoid classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A keyframe track violates its invariants.
    #[error("Invalid track '{name}': {reason}")]
    InvalidTrack {
        /// Track target name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// BVH text could not be parsed.
    #[error("BVH parse error at line {line}: {message}")]
    BvhParse {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// The exporter received data that violates the export contract.
    #[error("Export error: {0}")]
    Export(String),

    /// glTF container encoding or decoding error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the humanoid classifier. Every variant is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("hips not found")]
    HipsNotFound,

    #[error("chest not found")]
    ChestNotFound,

    #[error("insufficient spine bones (found {found}, need at least 3 including hips)")]
    InsufficientSpineBones { found: usize },

    #[error("insufficient {limb} bones (found {found}, need at least 3)")]
    InsufficientLimbBones { limb: &'static str, found: usize },

    #[error("foot not found")]
    FootNotFound,

    #[error("hand not found")]
    HandNotFound,

    #[error("required role '{0}' is missing")]
    MissingRole(HumanBoneName),

    #[error("bone is assigned to both '{existing}' and '{role}'")]
    DuplicateBone {
        role: HumanBoneName,
        existing: HumanBoneName,
    },
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<gltf::Error> for RetargetError {
    fn from(err: gltf::Error) -> Self {
        RetargetError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, RetargetError>`.
pub type Result<T> = std::result::Result<T, RetargetError>;
