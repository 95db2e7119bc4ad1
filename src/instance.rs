//! Social golfer instances.
//!
//! An instance file holds three whitespace-separated positive integers:
//! the number of groups, the group size and the number of weeks.
//!
//! ```
//! use golfer::Instance;
//!
//! let instance: Instance = "3 2 2".parse().unwrap();
//! assert_eq!(instance.golfers(), 6);
//! ```

use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use thiserror::Error;

/// Reasons an instance file is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInstance {
    #[error("expected three integers (groups, group size, weeks), found {found} token(s)")]
    TooFewTokens { found: usize },
    #[error("'{token}' is not an integer")]
    NotANumber { token: String },
    #[error("'{token}' must be a positive integer")]
    NotPositive { token: String },
}

/// Problem size parameters. The golfer count is always `groups * group_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instance {
    groups: usize,
    group_size: usize,
    weeks: usize,
}

impl Instance {
    /// Build an instance from already validated sizes.
    ///
    /// Returns `None` if any parameter is zero.
    pub fn new(groups: usize, group_size: usize, weeks: usize) -> Option<Self> {
        (groups > 0 && group_size > 0 && weeks > 0).then_some(Self {
            groups,
            group_size,
            weeks,
        })
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn weeks(&self) -> usize {
        self.weeks
    }

    pub fn golfers(&self) -> usize {
        self.groups * self.group_size
    }

    /// Number of unordered golfer pairs.
    pub fn pairs(&self) -> usize {
        let n = self.golfers();
        n * n.saturating_sub(1) / 2
    }

    /// Lexicographic rank of the pair `(p0, p1)` among all pairs, `p0 < p1`.
    pub fn pair_index(&self, p0: usize, p1: usize) -> usize {
        debug_assert!(p0 < p1 && p1 < self.golfers());
        let n = self.golfers();
        p0 * (2 * n - p0 - 1) / 2 + (p1 - p0 - 1)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} groups of {} over {} weeks ({} golfers)",
            self.groups,
            self.group_size,
            self.weeks,
            self.golfers()
        )
    }
}

fn positive(token: &str) -> Result<usize, MalformedInstance> {
    let value: i64 = token.parse().map_err(|_| MalformedInstance::NotANumber {
        token: token.to_string(),
    })?;
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| MalformedInstance::NotPositive {
            token: token.to_string(),
        })
}

impl FromStr for Instance {
    type Err = MalformedInstance;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Every token must be a positive integer; only the first three are used
        let values = s
            .split_whitespace()
            .map(positive)
            .collect::<Result<Vec<_>, _>>()?;
        let [groups, group_size, weeks, ..] = values[..] else {
            return Err(MalformedInstance::TooFewTokens {
                found: values.len(),
            });
        };

        Ok(Self {
            groups,
            group_size,
            weeks,
        })
    }
}

/// Read and parse an instance file.
pub fn read_instance(path: &Path) -> Result<Instance> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read instance file {}", path.display()))?;
    let instance: Instance = contents
        .parse()
        .with_context(|| format!("malformed instance file {}", path.display()))?;
    tracing::info!(%instance, "instance read");
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_instance() {
        let instance: Instance = "3 2 2\n".parse().unwrap();
        assert_eq!(instance.groups(), 3);
        assert_eq!(instance.group_size(), 2);
        assert_eq!(instance.weeks(), 2);
        assert_eq!(instance.golfers(), 6);
        assert_eq!(instance.pairs(), 15);
    }

    #[test]
    fn test_pair_index_is_dense() {
        let instance = Instance::new(2, 3, 1).unwrap();
        let mut seen = vec![false; instance.pairs()];
        for p0 in 0..instance.golfers() {
            for p1 in p0 + 1..instance.golfers() {
                let idx = instance.pair_index(p0, p1);
                assert!(!seen[idx], "pair ({p0}, {p1}) collides");
                seen[idx] = true;
            }
        }
        assert!(seen.into_iter().all(|s| s));
        assert_eq!(instance.pair_index(0, 1), 0);
        assert_eq!(instance.pair_index(4, 5), instance.pairs() - 1);
    }

    #[test]
    fn test_parse_uses_first_three_tokens() {
        let instance: Instance = "8 4 10 99".parse().unwrap();
        assert_eq!(instance, Instance::new(8, 4, 10).unwrap());
    }

    #[test]
    fn test_trailing_tokens_are_validated() {
        assert_eq!(
            "3 2 2 abc".parse::<Instance>(),
            Err(MalformedInstance::NotANumber { token: "abc".into() })
        );
        assert_eq!(
            "3 2 2 -1".parse::<Instance>(),
            Err(MalformedInstance::NotPositive { token: "-1".into() })
        );
    }

    #[test]
    fn test_too_few_tokens() {
        assert_eq!(
            "3 2".parse::<Instance>(),
            Err(MalformedInstance::TooFewTokens { found: 2 })
        );
        assert_eq!(
            "".parse::<Instance>(),
            Err(MalformedInstance::TooFewTokens { found: 0 })
        );
    }

    #[test]
    fn test_non_numeric_token() {
        assert_eq!(
            "3 two 2".parse::<Instance>(),
            Err(MalformedInstance::NotANumber {
                token: "two".into()
            })
        );
    }

    #[test]
    fn test_non_positive_token() {
        assert_eq!(
            "3 2 0".parse::<Instance>(),
            Err(MalformedInstance::NotPositive { token: "0".into() })
        );
        assert_eq!(
            "-1 2 2".parse::<Instance>(),
            Err(MalformedInstance::NotPositive { token: "-1".into() })
        );
    }

    #[test]
    fn test_read_instance_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_instance(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_read_instance_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instance.txt");
        fs::write(&path, "4 3 5").unwrap();
        assert_eq!(read_instance(&path).unwrap(), Instance::new(4, 3, 5).unwrap());
    }

    proptest! {
        #[test]
        fn golfers_is_groups_times_group_size(g in 1usize..50, s in 1usize..50, w in 1usize..50) {
            let instance: Instance = format!("{} {}\t{}\n", g, s, w).parse().unwrap();
            prop_assert_eq!(instance.golfers(), g * s);
            prop_assert_eq!(instance.weeks(), w);
        }
    }
}
