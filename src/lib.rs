//! Infer a `.clang-format` configuration from an existing codebase.
//!
//! The discovery engine runs coordinate descent over the clang-format
//! option space: for each tunable option it re-renders the corpus under
//! every candidate value and keeps the one that changes the least text,
//! iterating passes until a full pass changes nothing. Options already
//! present in a seed `.clang-format` are pinned and never searched.

pub mod catalog;
pub mod colors;
pub mod config;
pub mod corpus;
pub mod cost;
pub mod formatter;
pub mod progress;
pub mod report;
pub mod search;

pub use catalog::{CatalogError, Domain, OptionDef, PRIORITY_OPTIONS};
pub use colors::{should_use_colors, Colors};
pub use config::{
    find_seed_file, load_seed, parse_seed, render, EmitError, Seed, SeedError, StyleConfig,
    SEED_FILE_NAME,
};
pub use corpus::{collect, SourceCorpus, SourceFile};
pub use cost::{evaluate, line_diff_cost, MAX_COST};
pub use formatter::{inline_style, ClangFormat, Formatter, FormatterError};
pub use progress::ProgressReporter;
pub use report::ConsoleReporter;
pub use search::{
    discover, CancelFlag, CandidateResult, Discovery, SearchOptions, SearchReporter,
    SilentReporter, DEFAULT_MAX_PASSES,
};
