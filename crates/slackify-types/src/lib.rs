//! # slackify-types
//!
//! Core type definitions for slackify.
//!
//! Every other slackify crate depends on this one. It contains:
//!
//! - **[`item`]** -- [`Item`] envelopes and the [`Record`] they carry
//! - **[`config`]** -- Configuration schema and the [`FailureMode`] switch
//! - **[`node`]** -- Static node description (display name, properties)
//! - **[`error`]** -- [`SlackifyError`], [`NodeError`] and friends

pub mod config;
pub mod error;
pub mod item;
pub mod node;

pub use config::{Config, ConverterOptions, FailureMode, NodeSettings};
pub use error::{
    ConversionError, ErrorContext, NodeError, NodeOperationError, Result, SlackifyError,
};
pub use item::{Item, PairedItem, Record};
pub use node::{NodeDescription, NodeProperty, PropertyType};
