// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output/error/input filename templates.

use nd_core::{JobId, StepId};
use std::path::{Path, PathBuf};

/// Fields a filename pattern may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameContext {
    pub job_id: JobId,
    pub step_id: StepId,
    pub user: String,
    pub node_id: u32,
    pub cwd: PathBuf,
}

/// Expands a filename pattern for a job. Pure: no filesystem access.
pub trait NameTemplate: Send + Sync + 'static {
    fn resolve(&self, ctx: &NameContext, pattern: &str) -> PathBuf;
}

/// Default templates.
///
/// | token | expands to |
/// |-------|------------|
/// | `%j`  | job id |
/// | `%s`  | step id (`batch` for batch jobs) |
/// | `%u`  | user name |
/// | `%n`  | node index |
/// | `%%`  | `%` |
///
/// Unknown tokens are kept verbatim. Relative results are anchored at the
/// job's working directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternNames;

impl NameTemplate for PatternNames {
    fn resolve(&self, ctx: &NameContext, pattern: &str) -> PathBuf {
        let mut out = String::with_capacity(pattern.len() + 8);
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('j') => out.push_str(&ctx.job_id.to_string()),
                Some('s') => out.push_str(&ctx.step_id.to_string()),
                Some('u') => out.push_str(&ctx.user),
                Some('n') => out.push_str(&ctx.node_id.to_string()),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        anchor(&ctx.cwd, Path::new(&out))
    }
}

fn anchor(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
