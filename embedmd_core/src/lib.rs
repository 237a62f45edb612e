//! `embedmd_core` is the engine behind the [embedmd](https://github.com/campoy/embedmd) command line tool. It keeps code snippets in markdown documentation in sync with the files they come from: a directive names a local file or url and an optional pair of regular expressions, and the block that follows the directive is regenerated from that source.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Scanner (line state machine, finds directives outside code blocks)
//!   → Command parser (inline `[embedmd]:# (...)` or `embed:` front matter)
//!   → Fetcher (local file relative to the base directory, or http(s) url)
//!   → Extractor (start / end regular expressions, leftmost-longest)
//!   → Formatter (substitutions, trimming, template)
//!   → Runner (writes the fenced or plain block)
//! ```
//!
//! ## Directives
//!
//! ```text
//! [embedmd]:# (pathOrURL language /start regexp/ /end regexp/)
//! [embedmd]:# (pathOrURL language /regexp/)
//! [embedmd]:# (pathOrURL language /start regexp/ $)
//! [embedmd]:# (pathOrURL)
//! ```
//!
//! Flags may follow the path: `noCode`, `noStart`, `noEnd`, `trim`,
//! `trimPrefix:<text>`, `trimSuffix:<text>`, `template:<text>` and
//! `lang:<language>`. Substitutions are written `s/pattern/replacement/`
//! before the start expression.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use embedmd_core::Embedder;
//!
//! let embedder = Embedder::new().with_base_dir("docs");
//! let output = embedder
//! 	.process_to_string("# Title\n\n[embedmd]:# (main.go /func main/ /^}/)\n")
//! 	.unwrap();
//! print!("{output}");
//! ```

pub use command::*;
pub use config::*;
pub use error::*;
pub use extract::*;
pub use fetch::*;
pub use format::*;
pub use runner::*;
pub use scanner::process;

mod command;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod extract;
pub mod fetch;
mod format;
mod runner;
pub mod scanner;

#[cfg(test)]
mod __fixtures;
