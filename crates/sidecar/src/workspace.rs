// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WorkspaceService` (S1) — the sidecar's single path-confinement choke
//! point (§4.5, invariant 1 in §8). Every route handler resolves its path
//! argument through [`WorkspaceService::resolve`] before touching the
//! filesystem or handing the path to [`sbx_executor::LocalToolExecutor`];
//! anything that would escape the workspace root is rejected here, once,
//! rather than re-derived per service.

use crate::error::SidecarError;
use std::path::{Path, PathBuf};

pub struct WorkspaceService {
    root: PathBuf,
}

impl WorkspaceService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `rel` against the workspace root, rejecting anything that
    /// would escape it.
    ///
    /// The target need not exist yet (`writeFile` on a new path), so this
    /// walks up to the first existing ancestor and canonicalizes against
    /// that instead of the literal candidate — matching
    /// `LocalToolExecutor::resolve`'s same tradeoff, since a non-existent
    /// path can't be canonicalized directly.
    pub fn resolve(&self, rel: &str) -> Result<PathBuf, SidecarError> {
        let candidate = self.root.join(rel.trim_start_matches('/'));
        let canon_root = std::fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());

        let mut probe = candidate.clone();
        while !probe.exists() {
            match probe.parent() {
                Some(p) if p != probe => probe = p.to_path_buf(),
                _ => break,
            }
        }
        let canon_probe = std::fs::canonicalize(&probe).unwrap_or(probe);
        if !canon_probe.starts_with(&canon_root) {
            return Err(SidecarError::PathTraversal);
        }
        Ok(candidate)
    }

    /// Sum of file sizes under the workspace root, for `GET /status`'s
    /// `size_bytes`. Best-effort: unreadable entries are skipped rather
    /// than failing the whole query.
    pub fn size_bytes(&self) -> u64 {
        fn walk(dir: &Path) -> u64 {
            let Ok(rd) = std::fs::read_dir(dir) else { return 0 };
            let mut total = 0u64;
            for entry in rd.flatten() {
                let Ok(file_type) = entry.file_type() else { continue };
                if file_type.is_dir() {
                    total += walk(&entry.path());
                } else if let Ok(meta) = entry.metadata() {
                    total += meta.len();
                }
            }
            total
        }
        walk(&self.root)
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
