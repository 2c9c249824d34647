//! # siteware
//!
//! A small static site generator. HTML fragments in `src/` are wrapped in
//! templates chosen per directory, `static/` is mirrored alongside them, and
//! image directories can get automatic thumbnails.
//!
//! # Project Layout
//!
//! ```text
//! project/
//! ├── siteware.master.json     # { "output": "public" }
//! ├── src/                     # Page fragments (.html / .htm) + siteware.json
//! ├── static/                  # Copied verbatim to <output>/static/
//! └── templates/
//!     └── default.template     # Used when a page names no template
//! ```
//!
//! # Build Pipeline
//!
//! Every build is a full regeneration, run strictly in sequence:
//!
//! ```text
//! 1. Config     read + validate siteware.master.json (nothing touched yet)
//! 2. Reconcile  clear <output>/ except .git, static, .gitignore, CNAME;
//!               mirror static/ → <output>/static/
//! 3. Generate   walk src/, render pages, create directories, make thumbnails
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | [`BuildContext`](pipeline::BuildContext), [`BuildEvent`](pipeline::BuildEvent), and the [`build`](pipeline::build) entry point |
//! | [`config`] | Build config and per-directory `siteware.json` loading, validation and caching |
//! | [`reconcile`] | Clears the output directory around the protected entries, then syncs statics |
//! | [`sync`] | One-way, idempotent directory mirroring |
//! | [`generate`] | The source tree walk: directories, pages, thumbnails |
//! | [`render`] | Tera-based layout + content rendering and the `readdir` template function |
//! | [`imaging`] | Thumbnail derivation behind the [`ImageBackend`](imaging::ImageBackend) trait |
//! | [`init`] | Project scaffolding |
//! | [`serve`] | Minimal HTTP server for the built site |
//! | [`types`] | Template payload ([`Data`](types::Data)) and `readdir` entries |
//! | [`output`] | CLI output formatting for build events |
//!
//! # Design Decisions
//!
//! ## Layout Includes Content
//!
//! A page is rendered by parsing its template and its source file together:
//! the source becomes the template named `content`, and the layout pulls it
//! in with `{% include "content" %}`. Both see the same `data` value from
//! the directory config. Output is HTML-escaped by default.
//!
//! ## No Config Cascading
//!
//! Each directory's `siteware.json` stands alone. A directory without one
//! uses the default template and no data, whatever its parent says. This
//! keeps "which template renders this file" answerable by looking in one
//! place.
//!
//! ## Explicit Build Context
//!
//! There is no global state: paths, the build config, the config cache and
//! the event channel travel in a [`BuildContext`](pipeline::BuildContext)
//! created per build.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod init;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod render;
pub mod serve;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
