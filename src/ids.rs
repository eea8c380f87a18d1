//! Identifier generation.
//!
//! Task, column, and project ids are `<prefix>-<suffix>` where the suffix is
//! taken from the random tail of a fresh ULID, lowercased. Task suffixes
//! start at the configured minimum length and grow when the short space gets
//! crowded, so ids stay short on small boards and never collide on big ones.

use std::collections::HashSet;

use ulid::Ulid;

pub const PROJECT_ID_PREFIX: &str = "prj";
pub const COLUMN_ID_PREFIX: &str = "col";
const PROJECT_SUFFIX_LEN: usize = 8;
const COLUMN_SUFFIX_LEN: usize = 6;

const ULID_TIME_LEN: usize = 10;
const ULID_RANDOM_LEN: usize = 16;
const ULID_CHARSET_LEN: u128 = 32;

/// Tries per suffix length before growing it; collisions at a given length
/// are rare until its space is mostly used up.
const TRIES_PER_LEN: usize = 8;

fn random_suffix(len: usize) -> String {
    debug_assert!(len <= ULID_RANDOM_LEN);
    let base = Ulid::new().to_string().to_lowercase();
    base[ULID_TIME_LEN..ULID_TIME_LEN + len].to_string()
}

/// Generate a task id unique among `existing` ids.
pub fn task_id(prefix: &str, min_len: usize, existing: &HashSet<String>) -> String {
    let min_len = min_len.clamp(1, ULID_RANDOM_LEN);
    let suffixes: HashSet<&str> = existing
        .iter()
        .filter_map(|id| id.rsplit_once('-').map(|(_, suffix)| suffix))
        .collect();

    let mut len = min_len;
    loop {
        // Once the used share of a length's space is large, retries churn;
        // move up a character instead.
        let space = ulid_space_for_len(len);
        let used = suffixes.iter().filter(|s| s.len() == len).count() as u128;
        if used * 2 >= space && len < ULID_RANDOM_LEN {
            len += 1;
            continue;
        }

        for _ in 0..TRIES_PER_LEN {
            let candidate = random_suffix(len);
            if !suffixes.contains(candidate.as_str()) {
                return format!("{prefix}-{candidate}");
            }
        }
        if len < ULID_RANDOM_LEN {
            len += 1;
        }
    }
}

/// Generate a project id (fixed-length suffix).
pub fn project_id() -> String {
    format!("{PROJECT_ID_PREFIX}-{}", random_suffix(PROJECT_SUFFIX_LEN))
}

/// Generate a column id (fixed-length suffix).
pub fn column_id() -> String {
    format!("{COLUMN_ID_PREFIX}-{}", random_suffix(COLUMN_SUFFIX_LEN))
}

fn ulid_space_for_len(len: usize) -> u128 {
    let mut space = 1u128;
    for _ in 0..len {
        space *= ULID_CHARSET_LEN;
    }
    space
}
