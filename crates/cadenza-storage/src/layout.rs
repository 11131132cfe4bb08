// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File naming for snapshots and saved code.

use std::path::{Path, PathBuf};

/// Extension used for every Sonic Pi source file written.
pub const CODE_EXTENSION: &str = "pi";

/// `code_001.pi`, `code_002.pi`, ... Wider numbers are not truncated.
pub fn snapshot_file_name(sequence: u32) -> String {
    format!("code_{sequence:03}.{CODE_EXTENSION}")
}

pub fn snapshot_path(session_dir: &Path, sequence: u32) -> PathBuf {
    session_dir.join(snapshot_file_name(sequence))
}

/// `1.pi`, `2.pi`, ...
pub fn saved_path(saved_dir: &Path, index: u32) -> PathBuf {
    saved_dir.join(format!("{index}.{CODE_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_names_are_zero_padded() {
        assert_eq!(snapshot_file_name(1), "code_001.pi");
        assert_eq!(snapshot_file_name(42), "code_042.pi");
        assert_eq!(snapshot_file_name(1234), "code_1234.pi");
    }

    #[test]
    fn saved_names_are_plain_indices() {
        assert_eq!(saved_path(Path::new("/saved"), 3), PathBuf::from("/saved/3.pi"));
    }
}
