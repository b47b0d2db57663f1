//! Commit scanner
//!
//! Mines `git log` for commits carrying `Task:` / `Refs:` trailers:
//!
//! ```text
//! Task: TASK-F3-012
//! Refs: REQ-SEC-001, UC-002
//! ```
//!
//! Each keyword is queried separately and the results are merged by full hash.
//! Git being absent, slow or failing only ever yields an empty list.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::config::GitConfig;
use crate::models::CommitRef;

/// Keywords queried with `--grep`, in query order
pub const TRAILER_KEYWORDS: [&str; 2] = ["Refs:", "Task:"];

/// `git log` format: full hash, short hash, subject, author, strict ISO date, body
const LOG_FORMAT: &str = "--format=%H|%h|%s|%an|%aI|%b";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

static ENTRY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}\|").expect("entry start is a valid regex"));

static TASK_TRAILER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Task:\s*(TASK-F\d{1,2}-\d{3,4})\s*$").expect("task trailer is a valid regex")
});

static REFS_TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Refs:\s*(.+)$").expect("refs trailer is a valid regex"));

/// Source of raw `git log` output
pub trait CommitLog {
    /// Raw log output for commits whose message matches `keyword`, or `None` on failure
    fn grep(&self, keyword: &str) -> Option<String>;
}

/// `git` command-line client with a bounded wait per invocation
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    timeout: Duration,
}

impl GitCli {
    /// Client for the repository containing `path`
    #[must_use]
    pub fn new(path: &Path, timeout: Duration) -> Self {
        Self {
            repo: path.to_path_buf(),
            timeout,
        }
    }

    /// Whether `path` is inside a git work tree
    #[must_use]
    pub fn is_available(path: &Path) -> bool {
        git2::Repository::discover(path).is_ok_and(|repo| !repo.is_bare())
    }
}

impl CommitLog for GitCli {
    fn grep(&self, keyword: &str) -> Option<String> {
        let mut cmd = Command::new("git");
        cmd.args(["log", "--all", LOG_FORMAT, &format!("--grep={keyword}")])
            .current_dir(&self.repo);
        run_with_timeout(cmd, self.timeout)
    }
}

/// Run a command, returning its stdout if it exits successfully within `timeout`
///
/// The child is killed once the deadline passes.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Option<String> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::info!("git not available: {e}");
            return None;
        },
    };

    // Drain stdout on its own thread so a large log cannot block the child
    let mut stdout = child.stdout.take()?;
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                log::warn!("git timed out after {}s, skipping commit scan", timeout.as_secs());
                let _ = child.kill();
                let _ = child.wait();
                return None;
            },
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                log::warn!("cannot wait on git: {e}");
                return None;
            },
        }
    };

    let output = reader.join().ok()?.ok()?;
    if !status.success() {
        log::warn!("git log exited with {status}");
        return None;
    }
    Some(String::from_utf8_lossy(&output).into_owned())
}

/// One commit as printed by [`LOG_FORMAT`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Full hash
    pub full_sha: String,
    /// Abbreviated hash
    pub sha: String,
    /// Subject line
    pub subject: String,
    /// Author name
    pub author: String,
    /// Author date
    pub date: String,
    /// Body, possibly spanning several lines
    pub body: String,
}

/// Split raw log output into entries
///
/// A new entry starts at every line beginning with a full hash and a `|`.
/// Headers with fewer than five fields are skipped.
#[must_use]
pub fn parse_log(raw: &str) -> Vec<LogEntry> {
    let mut chunks: Vec<Vec<&str>> = Vec::new();
    for line in raw.lines() {
        if ENTRY_START.is_match(line) {
            chunks.push(vec![line]);
        } else if let Some(chunk) = chunks.last_mut() {
            chunk.push(line);
        }
    }

    chunks
        .into_iter()
        .filter_map(|chunk| {
            let (header, rest) = chunk.split_first()?;
            let parts: Vec<&str> = header.splitn(6, '|').collect();
            if parts.len() < 5 {
                return None;
            }
            let mut body = parts.get(5).copied().unwrap_or_default().to_string();
            for line in rest {
                body.push('\n');
                body.push_str(line);
            }
            Some(LogEntry {
                full_sha: parts[0].to_string(),
                sha: parts[1].to_string(),
                subject: parts[2].to_string(),
                author: parts[3].to_string(),
                date: parts[4].to_string(),
                body: body.trim().to_string(),
            })
        })
        .collect()
}

/// Extract the `Task:` id and the `Refs:` ids from a commit body
///
/// Only the first trailer of each kind counts.
#[must_use]
pub fn parse_trailers(body: &str) -> (Option<String>, Vec<String>) {
    let task = TASK_TRAILER.captures(body).map(|c| c[1].to_string());
    let refs = REFS_TRAILER
        .captures(body)
        .map(|c| {
            c[1].split(',').map(str::trim).filter(|id| !id.is_empty()).map(String::from).collect()
        })
        .unwrap_or_default();
    (task, refs)
}

/// Merge the per-keyword query results by full hash and parse their trailers
///
/// The first occurrence of a commit wins; a later one only fills in an
/// empty body.
pub fn collect_commits(log: &impl CommitLog) -> Vec<CommitRef> {
    let mut entries: Vec<LogEntry> = Vec::new();
    let mut by_sha: HashMap<String, usize> = HashMap::new();

    for keyword in TRAILER_KEYWORDS {
        let Some(raw) = log.grep(keyword) else {
            continue;
        };
        for entry in parse_log(&raw) {
            if let Some(&i) = by_sha.get(&entry.full_sha) {
                if entries[i].body.is_empty() && !entry.body.is_empty() {
                    entries[i].body = entry.body;
                }
                continue;
            }
            by_sha.insert(entry.full_sha.clone(), entries.len());
            entries.push(entry);
        }
    }

    entries
        .into_iter()
        .map(|entry| {
            let (task_id, ref_ids) = parse_trailers(&entry.body);
            CommitRef {
                sha: entry.sha,
                full_sha: entry.full_sha,
                message: entry.subject,
                author: entry.author,
                date: entry.date,
                task_id,
                ref_ids,
            }
        })
        .collect()
}

/// Scan the project's git history
///
/// Returns an empty list when scanning is disabled or the project is not a
/// git work tree.
#[must_use]
pub fn scan_commits(project_root: &Path, config: &GitConfig) -> Vec<CommitRef> {
    if !config.enabled {
        log::debug!("commit scan disabled");
        return Vec::new();
    }
    if !GitCli::is_available(project_root) {
        log::info!("not a git work tree, skipping commit scan");
        return Vec::new();
    }

    let commits = collect_commits(&GitCli::new(project_root, config.timeout()));
    log::info!("found {} commits with Refs:/Task: trailers", commits.len());
    commits
}
