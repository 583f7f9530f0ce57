/// Best-progress record, kept across sessions.
///
/// ## File format:
///   Key-value lines (`key=value`), unknown keys ignored:
///
///     best_score=42
///     total_jumps=310
///     total_misses=97
///
/// Stored as best.dat next to the executable, or in ~/.local/share/hopper
/// for system installs.

use std::path::PathBuf;

const RECORD_FILE: &str = "best.dat";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub best_score: usize,
    pub total_jumps: u64,
    pub total_misses: u64,
}

impl Record {
    /// Fold a finished session into the record. Returns true on a new best.
    pub fn absorb(&mut self, score: usize, jumps: u64, misses: u64) -> bool {
        self.total_jumps += jumps;
        self.total_misses += misses;
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs won't be)
            let test_path = parent.join(".write_test_hopper");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/hopper)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hopper");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn record_path() -> PathBuf {
    save_dir().join(RECORD_FILE)
}

// ══════════════════════════════════════════════════════════════
// Load / store
// ══════════════════════════════════════════════════════════════

pub fn save_record(record: &Record) -> Result<(), String> {
    let path = record_path();
    std::fs::write(&path, serialize(record))
        .map_err(|e| format!("Saving {} failed: {}", path.display(), e))
}

/// Missing or unreadable file → None.
pub fn load_record() -> Option<Record> {
    let candidates = [record_path(), PathBuf::from(RECORD_FILE)];
    for path in &candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_record(&content);
        }
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Text format
// ══════════════════════════════════════════════════════════════

fn serialize(r: &Record) -> String {
    format!(
        "best_score={}\ntotal_jumps={}\ntotal_misses={}\n",
        r.best_score, r.total_jumps, r.total_misses
    )
}

fn parse_record(content: &str) -> Option<Record> {
    let mut record = Record::default();
    let mut saw_best = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        let (key, val) = match line.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        match key.trim() {
            "best_score" => {
                record.best_score = val.trim().parse().ok()?;
                saw_best = true;
            }
            "total_jumps" => record.total_jumps = val.trim().parse().ok()?,
            "total_misses" => record.total_misses = val.trim().parse().ok()?,
            _ => {}
        }
    }
    if saw_best { Some(record) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_format_reads_back() {
        let r = Record { best_score: 42, total_jumps: 310, total_misses: 97 };
        assert_eq!(parse_record(&serialize(&r)), Some(r));
    }

    #[test]
    fn parse_tolerates_comments_and_unknown_keys() {
        let text = "# hopper\nversion=2\nbest_score = 7\n\ntotal_jumps=9\n";
        let r = parse_record(text).unwrap();
        assert_eq!(r.best_score, 7);
        assert_eq!(r.total_jumps, 9);
        assert_eq!(r.total_misses, 0);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("best_score=lots"), None);
        assert_eq!(parse_record("total_jumps=3"), None);
    }

    #[test]
    fn absorb_keeps_best_and_accumulates_totals() {
        let mut r = Record { best_score: 10, total_jumps: 5, total_misses: 1 };
        assert!(!r.absorb(4, 10, 6));
        assert_eq!(r.best_score, 10);
        assert!(r.absorb(12, 20, 2));
        assert_eq!(r, Record { best_score: 12, total_jumps: 35, total_misses: 9 });
    }
}
