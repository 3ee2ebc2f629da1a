//! `.clang-format` document support.
//!
//! This module provides:
//! - The flat, insertion-ordered [`StyleConfig`] the search engine works on
//! - Seed file discovery, loading and pin classification
//! - Emission of the merged seed + discovered configuration

mod emit;
mod seed;
mod style;

pub use emit::{render, write, EmitError};
pub use seed::{
    find_seed_file, load_seed, parse_seed, pin_config, Seed, SeedError, SeedValue, SEED_FILE_NAME,
};
pub use style::{
    flatten_mapping, insert_nested, scalar_to_string, typed_scalar, StyleConfig, KEY_DELIMITER,
};
