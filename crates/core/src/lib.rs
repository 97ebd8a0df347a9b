//! Core library for repopilot
//!
//! This crate implements the **Functional Core** of the repopilot application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`repopilot_core`** (this crate): Pure transformation functions with zero I/O
//! - **`repopilot`**: HTTP clients, scratch storage and orchestration (the Imperative Shell)
//!
//! Everything here is deterministic and testable with fixture data. The shell
//! decides where bytes come from and where they go.
//!
//! # Module Organization
//!
//! - [`attachments`]: data-URI decoding and attachment preview formatting
//! - [`generate`]: prompt building, fallback content and completion splitting
//! - [`github`]: REST wire types, upsert planning, Pages status and license text
//!
//! # Example Usage
//!
//! ```rust
//! use repopilot_core::generate::{split_response, SplitContext};
//!
//! let ctx = SplitContext {
//!     brief: "Say hi",
//!     checks: &[],
//!     attachments_meta: "",
//!     round: 1,
//! };
//! let files = split_response("<div>hi</div>\n---README.md---\n# Hi\n", &ctx);
//!
//! assert_eq!(files.index_html, "<div>hi</div>");
//! assert_eq!(files.readme, "# Hi");
//! ```

pub mod attachments;
pub mod generate;
pub mod github;
