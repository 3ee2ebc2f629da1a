//! Input corpus: the C/C++ sources discovery measures against.
//!
//! Files are read once at startup and held in memory for the whole run;
//! they are never written back. Binary and non-UTF-8 files are skipped.

use std::fs;
use std::io;
use std::path::PathBuf;

use ignore::WalkBuilder;

/// Extensions of files considered part of the corpus.
pub const CXX_EXTENSIONS: &[&str] = &[
    "cpp", "cxx", "cc", "c", "hpp", "hxx", "hh", "h", "ipp",
];

const BINARY_CHECK_SIZE: usize = 8192;

/// One source file, path plus original text.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Ordered, read-only collection of source files.
#[derive(Debug, Clone, Default)]
pub struct SourceCorpus {
    files: Vec<SourceFile>,
}

impl SourceCorpus {
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Check if content is binary by looking for null bytes in the first 8192
/// bytes.
fn is_binary(content: &[u8]) -> bool {
    let check_len = content.len().min(BINARY_CHECK_SIZE);
    content[..check_len].contains(&0)
}

fn has_cxx_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            CXX_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Walk `paths` (files or directories, gitignore respected), read every
/// C/C++ source into memory, and return them sorted by path so runs are
/// reproducible regardless of walk order.
pub fn collect(paths: &[String]) -> io::Result<SourceCorpus> {
    let mut files = vec![];

    for path in paths {
        let walker = WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| io::Error::other(e.to_string()))?;
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.into_path();
            if !has_cxx_extension(&path) {
                continue;
            }
            let bytes = fs::read(&path)?;
            if is_binary(&bytes) {
                continue;
            }
            let Ok(text) = String::from_utf8(bytes) else {
                continue;
            };
            files.push(SourceFile { path, text });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(SourceCorpus::from_files(files))
}
