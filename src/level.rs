//! Static level data and navigation over it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::LevelError;
use crate::model::{TUBE_CAPACITY, Tube};

const BUILTIN_LEVELS: &str = include_str!("../levels/default.toml");

/// One puzzle. Shared read-only between sessions of the same level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub tubes: Vec<Tube>,
    pub par_moves: Option<u32>,
    /// Tube index to successful moves remaining before it unlocks.
    pub unlock_after_moves: BTreeMap<usize, u32>,
    pub is_demo_level: bool,
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    #[serde(default)]
    level: Vec<LevelDef>,
}

#[derive(Debug, Deserialize)]
struct LevelDef {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    par_moves: Option<u32>,
    #[serde(default)]
    is_demo_level: bool,
    tubes: Vec<String>,
    #[serde(default)]
    locks: Vec<LockDef>,
}

#[derive(Debug, Deserialize)]
struct LockDef {
    tube: usize,
    after_moves: u32,
}

impl LevelDef {
    fn into_level(self) -> Result<Level, LevelError> {
        let mut tubes = Vec::with_capacity(self.tubes.len());
        for (i, repr) in self.tubes.iter().enumerate() {
            let tube = Tube::new_from_repr(repr, TUBE_CAPACITY).map_err(|e| {
                LevelError::InvalidTube {
                    level: self.id.clone(),
                    tube: i,
                    source: Box::new(e),
                }
            })?;
            tubes.push(tube);
        }
        let mut unlock_after_moves = BTreeMap::new();
        for lock in &self.locks {
            if lock.tube >= tubes.len() {
                return Err(LevelError::LockOutOfRange {
                    level: self.id.clone(),
                    tube: lock.tube,
                    tube_count: tubes.len(),
                });
            }
            unlock_after_moves.insert(lock.tube, lock.after_moves);
        }
        Ok(Level {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            difficulty: self.difficulty.unwrap_or_else(|| "Normal".to_string()),
            id: self.id,
            tags: self.tags,
            tubes,
            par_moves: self.par_moves,
            unlock_after_moves,
            is_demo_level: self.is_demo_level,
        })
    }
}

/// Ordered, non-empty collection of levels. Navigation wraps around.
#[derive(Clone, Debug)]
pub struct LevelSet {
    levels: Vec<Arc<Level>>,
    demo_indices: Vec<usize>,
}

impl LevelSet {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.id.as_str()) {
                return Err(LevelError::DuplicateId(level.id.clone()));
            }
        }
        let mut demo_indices: Vec<usize> = levels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_demo_level)
            .map(|(i, _)| i)
            .collect();
        if demo_indices.is_empty() {
            demo_indices.push(0);
        }
        Ok(Self {
            levels: levels.into_iter().map(Arc::new).collect(),
            demo_indices,
        })
    }

    /// The level pack compiled into the binary.
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_toml_str(BUILTIN_LEVELS)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        let file: LevelFile = toml::from_str(content)?;
        let levels = file
            .level
            .into_iter()
            .map(LevelDef::into_level)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = levels.len(), "Parsed level definitions");
        Self::new(levels)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let content = std::fs::read_to_string(path).map_err(|e| LevelError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at `index`, wrapped modulo the set size.
    pub fn get(&self, index: usize) -> &Arc<Level> {
        &self.levels[index % self.levels.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Level>> {
        self.levels.iter()
    }

    pub fn demo_indices(&self) -> &[usize] {
        &self.demo_indices
    }

    pub fn first_demo(&self) -> usize {
        self.demo_indices[0]
    }

    pub fn is_demo_index(&self, index: usize) -> bool {
        self.demo_indices.contains(&index)
    }

    pub fn next_index(&self, current: usize, demo_only: bool) -> usize {
        self.step(current, demo_only, 1)
    }

    pub fn prev_index(&self, current: usize, demo_only: bool) -> usize {
        self.step(current, demo_only, -1)
    }

    fn step(&self, current: usize, demo_only: bool, delta: isize) -> usize {
        if demo_only {
            let pos = self
                .demo_indices
                .iter()
                .position(|&i| i == current)
                .unwrap_or(0);
            let next = wrap(pos, delta, self.demo_indices.len());
            self.demo_indices[next]
        } else {
            wrap(current, delta, self.levels.len())
        }
    }
}

fn wrap(index: usize, delta: isize, len: usize) -> usize {
    (index as isize + delta).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[level]]
id = "a"
tubes = ["ABAB", "BABA", "", ""]
par_moves = 5

[[level]]
id = "b"
name = "Bee"
is_demo_level = true
tubes = ["AAAA", ""]
locks = [{ tube = 1, after_moves = 2 }]

[[level]]
id = "c"
is_demo_level = true
tubes = ["A"]
"#;

    #[test]
    fn test_builtin_levels_parse() {
        let set = LevelSet::builtin().unwrap();
        assert!(set.len() >= 3);
        for level in set.iter() {
            assert!(level.tubes.iter().all(|t| t.len() <= TUBE_CAPACITY));
        }
    }

    #[test]
    fn test_parse_sample() {
        let set = LevelSet::from_toml_str(SAMPLE).unwrap();
        assert_eq!(set.len(), 3);
        let a = set.get(0);
        assert_eq!(a.name, "a");
        assert_eq!(a.difficulty, "Normal");
        assert_eq!(a.par_moves, Some(5));
        assert_eq!(a.tubes.len(), 4);
        let b = set.get(1);
        assert_eq!(b.name, "Bee");
        assert_eq!(b.unlock_after_moves.get(&1), Some(&2));
        assert_eq!(set.demo_indices(), &[1, 2]);
    }

    #[test]
    fn test_navigation_wraps() {
        let set = LevelSet::from_toml_str(SAMPLE).unwrap();
        assert_eq!(set.next_index(2, false), 0);
        assert_eq!(set.prev_index(0, false), 2);
        assert_eq!(set.next_index(2, true), 1);
        assert_eq!(set.prev_index(1, true), 2);
        // Not a demo level: treated as the first demo position.
        assert_eq!(set.next_index(0, true), 2);
        assert_eq!(set.get(4).id, "b");
    }

    #[test]
    fn test_no_demo_levels_falls_back_to_first() {
        let set = LevelSet::from_toml_str("[[level]]\nid = \"x\"\ntubes = [\"A\"]\n").unwrap();
        assert_eq!(set.demo_indices(), &[0]);
    }

    #[test]
    fn test_rejects_bad_levels() {
        assert!(matches!(LevelSet::from_toml_str(""), Err(LevelError::Empty)));
        let overfull = "[[level]]\nid = \"x\"\ntubes = [\"AAAAA\"]\n";
        assert!(matches!(
            LevelSet::from_toml_str(overfull),
            Err(LevelError::InvalidTube { tube: 0, .. })
        ));
        let bad_lock = "[[level]]\nid = \"x\"\ntubes = [\"A\"]\nlocks = [{ tube = 3, after_moves = 1 }]\n";
        assert!(matches!(
            LevelSet::from_toml_str(bad_lock),
            Err(LevelError::LockOutOfRange { tube: 3, .. })
        ));
        let dup = "[[level]]\nid = \"x\"\ntubes = []\n[[level]]\nid = \"x\"\ntubes = []\n";
        assert!(matches!(
            LevelSet::from_toml_str(dup),
            Err(LevelError::DuplicateId(_))
        ));
    }
}
