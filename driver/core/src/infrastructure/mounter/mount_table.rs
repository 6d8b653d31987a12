// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mount table reader
//!
//! Parses the fstab-style format of `/proc/mounts`. Whitespace and
//! backslashes inside fields are written as three-digit octal escapes
//! (`\040` for a space), which are decoded here.

use std::path::{Path, PathBuf};

use crate::domain::mounter::MountError;

pub const PROC_MOUNTS: &str = "/proc/mounts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub options: Vec<String>,
}

/// Parse the whole table, skipping malformed lines
pub fn parse_mounts(content: &str) -> Vec<MountEntry> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<MountEntry> {
    let mut fields = line.split_whitespace();
    let source = fields.next()?;
    let mount_point = fields.next()?;
    let fs_type = fields.next()?;
    let options = fields.next().unwrap_or_default();

    Some(MountEntry {
        source: unescape(source),
        mount_point: PathBuf::from(unescape(mount_point)),
        fs_type: unescape(fs_type),
        options: options
            .split(',')
            .filter(|o| !o.is_empty())
            .map(unescape)
            .collect(),
    })
}

/// Decode `\NNN` octal escapes; anything else passes through untouched
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') * 64 + (bytes[i + 2] - b'0') * 8 + (bytes[i + 3] - b'0');
            out.push(value);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.len() == 3
        && digits[0] <= b'3'
        && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}

/// Whether `path` appears as a mount point in `entries`
pub fn is_mount_point(entries: &[MountEntry], path: &Path) -> bool {
    entries.iter().any(|e| e.mount_point == path)
}

/// Read and parse the mount table at `table`
pub async fn read_mounts(table: &Path) -> Result<Vec<MountEntry>, MountError> {
    let content = tokio::fs::read_to_string(table)
        .await
        .map_err(|source| MountError::MountTable {
            path: table.to_path_buf(),
            source,
        })?;
    Ok(parse_mounts(&content))
}
