//! Resolver head file rewriting.
//!
//! The directory service reads resolver state while it starts, so the head
//! file (`/etc/resolvconf/resolv.conf.d/head` on the appliance) must be
//! rewritten atomically before the service binds: write a sibling temp file
//! and rename it into place.
//!
//! Rewrites are line-anchored: only `domain`, `search`, and `nameserver`
//! lines are touched; everything else (comments, options) passes through.

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use crate::error::{FirstbootError, Result};

/// Rewrite the `domain` and `search` lines to `realm`, preserving its case.
///
/// Missing lines are appended; a missing file is treated as empty.
pub fn write_search_domain(head: &Path, realm: &str) -> Result<()> {
    rewrite(head, |lines| {
        let mut saw_domain = false;
        let mut saw_search = false;

        for line in lines.iter_mut() {
            if is_keyword_line(line, "domain") {
                *line = format!("domain {}", realm);
                saw_domain = true;
            } else if is_keyword_line(line, "search") {
                *line = format!("search {}", realm);
                saw_search = true;
            }
        }
        if !saw_domain {
            lines.push(format!("domain {}", realm));
        }
        if !saw_search {
            lines.push(format!("search {}", realm));
        }
    })
}

/// Rewrite every `nameserver` line to `nameserver <addr>`, appending one if
/// none is present.
pub fn write_nameserver(head: &Path, addr: IpAddr) -> Result<()> {
    rewrite(head, |lines| {
        let mut saw_nameserver = false;

        for line in lines.iter_mut() {
            if is_keyword_line(line, "nameserver") {
                *line = format!("nameserver {}", addr);
                saw_nameserver = true;
            }
        }
        if !saw_nameserver {
            lines.push(format!("nameserver {}", addr));
        }
    })
}

/// A resolver keyword line: the keyword followed by whitespace (or alone).
fn is_keyword_line(line: &str, keyword: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed == keyword
        || trimmed
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn rewrite(head: &Path, edit: impl FnOnce(&mut Vec<String>)) -> Result<()> {
    let content = match fs::read_to_string(head) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(FirstbootError::resolver(format!(
                "failed to read {:?}: {}",
                head, e
            )));
        }
    };

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    edit(&mut lines);

    let mut new_content = lines.join("\n");
    new_content.push('\n');

    // Sibling temp file, then rename: the service must never observe a
    // half-written head file
    let tmp = head.with_extension("tmp");
    fs::write(&tmp, &new_content).map_err(|e| {
        FirstbootError::resolver(format!("failed to write {:?}: {}", tmp, e))
    })?;
    fs::rename(&tmp, head).map_err(|e| {
        FirstbootError::resolver(format!("failed to rename {:?} into place: {}", tmp, e))
    })?;

    Ok(())
}
