//! Diffs between live records and staged dumps.
//!
//! Both sides are compared in their canonical YAML form, line by line. A
//! side with no record is replaced by a placeholder line, so additions and
//! deletions still show up as a change.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::deploy::types::DeployResult;
use crate::dump::{Dump, DumpStorage, Dumper};
use crate::storage::ContentStore;

/// Active-side placeholder when only the staged dump exists.
pub const ENTITY_ADDED: &str = "Entity added";

/// Staged-side placeholder when only the live record exists.
pub const ENTITY_DELETED: &str = "Entity deleted";

/// Whether a diff line is shared, removed or added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Equal,
    Delete,
    Insert,
}

impl DiffTag {
    /// Unified diff line prefix.
    #[must_use]
    pub const fn prefix(&self) -> char {
        match self {
            Self::Equal => ' ',
            Self::Delete => '-',
            Self::Insert => '+',
        }
    }
}

/// One line of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

impl DiffLine {
    fn new(tag: DiffTag, text: &str) -> Self {
        Self {
            tag,
            text: text.to_string(),
        }
    }
}

/// Line diff between the active and staged text of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentDiff {
    pub active: String,
    pub staged: String,
    pub lines: Vec<DiffLine>,
}

impl ContentDiff {
    /// Diff two texts split on `\n`.
    #[must_use]
    pub fn new(active: String, staged: String) -> Self {
        let old: Vec<&str> = active.split('\n').collect();
        let new: Vec<&str> = staged.split('\n').collect();
        let lines = line_diff(&old, &new);
        Self {
            active,
            staged,
            lines,
        }
    }

    /// Number of lines only in the staged text.
    #[must_use]
    pub fn insertions(&self) -> usize {
        self.count(DiffTag::Insert)
    }

    /// Number of lines only in the active text.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.count(DiffTag::Delete)
    }

    fn count(&self, tag: DiffTag) -> usize {
        self.lines.iter().filter(|line| line.tag == tag).count()
    }

    /// Render as unified diff hunks with `context` lines around each change.
    #[must_use]
    pub fn render(&self, context: usize) -> String {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return String::new();
        };

        // Inclusive line ranges, merged when their context overlaps.
        let mut hunks: Vec<(usize, usize)> = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            if line.tag == DiffTag::Equal {
                continue;
            }
            let start = index.saturating_sub(context);
            let end = (index + context).min(last);
            match hunks.last_mut() {
                Some((_, hunk_end)) if start <= *hunk_end + 1 => *hunk_end = end,
                _ => hunks.push((start, end)),
            }
        }

        // Old and new line numbers reached before each line.
        let mut positions = Vec::with_capacity(self.lines.len());
        let (mut old_line, mut new_line) = (0, 0);
        for line in &self.lines {
            positions.push((old_line, new_line));
            if line.tag != DiffTag::Insert {
                old_line += 1;
            }
            if line.tag != DiffTag::Delete {
                new_line += 1;
            }
        }

        let mut out = String::new();
        for (start, end) in hunks {
            let hunk = &self.lines[start..=end];
            let old_len = hunk.iter().filter(|l| l.tag != DiffTag::Insert).count();
            let new_len = hunk.iter().filter(|l| l.tag != DiffTag::Delete).count();
            let (old_start, new_start) = positions[start];

            out.push_str(&format!(
                "@@ -{},{old_len} +{},{new_len} @@\n",
                old_start + 1,
                new_start + 1
            ));
            for line in hunk {
                out.push(line.tag.prefix());
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        out
    }
}

/// Shortest line diff (Myers).
///
/// Common leading and trailing lines are matched first; the edit search
/// only covers the changed middle and keeps `O(D^2)` state for `D` edits.
#[must_use]
pub fn line_diff(old: &[&str], new: &[&str]) -> Vec<DiffLine> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut lines = Vec::with_capacity(old.len().max(new.len()));
    lines.extend(old[..prefix].iter().map(|t| DiffLine::new(DiffTag::Equal, t)));
    lines.extend(shortest_edit(
        &old[prefix..old.len() - suffix],
        &new[prefix..new.len() - suffix],
    ));
    lines.extend(
        old[old.len() - suffix..]
            .iter()
            .map(|t| DiffLine::new(DiffTag::Equal, t)),
    );

    lines
}

/// Myers greedy search for the shortest edit script, then a walk back
/// through the saved frontiers.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn shortest_edit(old: &[&str], new: &[&str]) -> Vec<DiffLine> {
    let (n, m) = (old.len() as isize, new.len() as isize);
    let max = n + m;
    let offset = max + 1;
    let index = |k: isize| (offset + k) as usize;

    // v[index(k)]: furthest x reached on diagonal k = x - y
    let mut v = vec![0isize; (2 * max + 3) as usize];
    // trace[d]: diagonals -(d + 1)..=d + 1 of v before step d
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(v[index(-d - 1)..=index(d + 1)].to_vec());
        for k in (-d..=d).step_by(2) {
            let mut x = if k == -d || (k != d && v[index(k - 1)] < v[index(k + 1)]) {
                v[index(k + 1)]
            } else {
                v[index(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            v[index(k)] = x;
            if x >= n && y >= m {
                break 'search;
            }
        }
    }

    let mut lines = Vec::new();
    let (mut x, mut y) = (n, m);
    for (d, frontier) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let at = |k: isize| frontier[(k + d + 1) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            lines.push(DiffLine::new(DiffTag::Equal, old[x as usize]));
        }
        if d > 0 {
            if x == prev_x {
                lines.push(DiffLine::new(DiffTag::Insert, new[(y - 1) as usize]));
            } else {
                lines.push(DiffLine::new(DiffTag::Delete, old[(x - 1) as usize]));
            }
        }
        x = prev_x;
        y = prev_y;
    }

    lines.reverse();
    lines
}

/// Diff two optional dumps.
///
/// Returns `None` when both are absent or their YAML is identical.
///
/// # Errors
///
/// Returns an error if a dump cannot be serialized.
pub fn diff_between_dumps(
    active: Option<&Dump>,
    staged: Option<&Dump>,
) -> DeployResult<Option<ContentDiff>> {
    if active.is_none() && staged.is_none() {
        return Ok(None);
    }

    let active = match active {
        Some(dump) => dump.to_yaml()?,
        None => ENTITY_ADDED.to_string(),
    };
    let staged = match staged {
        Some(dump) => dump.to_yaml()?,
        None => ENTITY_DELETED.to_string(),
    };

    if active == staged {
        return Ok(None);
    }
    Ok(Some(ContentDiff::new(active, staged)))
}

/// Computes diffs between a live store and a dump storage.
pub struct DiffGenerator<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    storage: &'a DumpStorage,
}

impl<'a, S: ContentStore + ?Sized> DiffGenerator<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, storage: &'a DumpStorage) -> Self {
        Self { store, storage }
    }

    /// Diff every staged dump. `None` marks a dump in sync.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be listed or a side cannot be
    /// loaded or dumped.
    pub fn diff(&self) -> DeployResult<BTreeMap<String, Option<ContentDiff>>> {
        let mut diffs = BTreeMap::new();
        for dependency_name in self.storage.list_all()? {
            let diff = self.diff_single(&dependency_name)?;
            diffs.insert(dependency_name, diff);
        }
        Ok(diffs)
    }

    /// Diff the live record and staged dump for one dependency name.
    ///
    /// # Errors
    ///
    /// Returns an error if a side cannot be loaded or dumped.
    pub fn diff_single(&self, dependency_name: &str) -> DeployResult<Option<ContentDiff>> {
        let staged = self.storage.load(dependency_name)?;
        self.diff_staged(dependency_name, staged.as_ref())
    }

    /// Diff the live record for `dependency_name` against an already loaded
    /// staged dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the live record cannot be loaded or dumped.
    pub fn diff_staged(
        &self,
        dependency_name: &str,
        staged: Option<&Dump>,
    ) -> DeployResult<Option<ContentDiff>> {
        let active = match self.store.load_counterpart(dependency_name)? {
            Some(entity) => Some(Dumper::new(self.store).dump(&entity)?),
            None => None,
        };

        diff_between_dumps(active.as_ref(), staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixture;
    use tempfile::TempDir;

    fn tags(diff: &[DiffLine]) -> String {
        diff.iter().map(|line| line.tag.prefix()).collect()
    }

    #[test]
    fn test_line_diff() {
        let diff = line_diff(&["a", "b", "c", "d"], &["a", "x", "c", "d", "e"]);
        assert_eq!(tags(&diff), " -+  +");
        assert_eq!(diff[1].text, "b");
        assert_eq!(diff[2].text, "x");
        assert_eq!(diff[5].text, "e");
    }

    #[test]
    fn test_line_diff_shapes() {
        assert_eq!(tags(&line_diff(&["a", "b"], &["a", "b"])), "  ");
        assert_eq!(tags(&line_diff(&["a", "b", "c"], &["a", "x", "c"])), " -+ ");
        assert_eq!(tags(&line_diff(&[], &["a"])), "+");
        assert_eq!(tags(&line_diff(&["a"], &[])), "-");
        assert_eq!(tags(&line_diff(&["a"], &["a", "a"])), " +");
        assert_eq!(tags(&line_diff(&["x", "a", "b"], &["a", "b", "y"])), "-  +");
    }

    #[test]
    fn test_line_diff_large_block_stays_minimal() {
        let old: Vec<String> = (0..20_000).map(|i| format!("line {i}")).collect();
        let mut new = old.clone();
        new[5_000] = "changed".to_string();
        new.insert(15_000, "inserted".to_string());
        let old: Vec<&str> = old.iter().map(String::as_str).collect();
        let new: Vec<&str> = new.iter().map(String::as_str).collect();

        let diff = line_diff(&old, &new);
        let edits: Vec<&DiffLine> = diff.iter().filter(|l| l.tag != DiffTag::Equal).collect();
        assert_eq!(edits.len(), 3);
        assert_eq!(edits[0].text, "line 5000");
        assert_eq!(edits[1].text, "changed");
        assert_eq!(edits[2].text, "inserted");
        assert_eq!(diff.len(), 20_002);
    }

    #[test]
    fn test_content_diff_counts_and_render() {
        let diff = ContentDiff::new("a\nb\nc\nd\ne\nf".into(), "a\nb\nX\nd\ne\nf".into());
        assert_eq!(diff.insertions(), 1);
        assert_eq!(diff.deletions(), 1);
        assert_eq!(
            diff.render(1),
            "@@ -2,3 +2,3 @@\n b\n-c\n+X\n d\n"
        );
        assert_eq!(diff.render(0), "@@ -3,1 +3,1 @@\n-c\n+X\n");
    }

    #[test]
    fn test_render_separate_hunks() {
        let diff = ContentDiff::new(
            "1\n2\n3\n4\n5\n6\n7\n8".into(),
            "0\n2\n3\n4\n5\n6\n7\n9".into(),
        );
        let rendered = diff.render(1);
        assert_eq!(rendered.matches("@@ -").count(), 2);
        assert!(rendered.starts_with("@@ -1,2 +1,2 @@\n-1\n+0\n 2\n"));
        assert!(rendered.ends_with("@@ -7,2 +7,2 @@\n 7\n-8\n+9\n"));
    }

    #[test]
    fn test_diff_between_dumps_placeholders() {
        let mut store = fixture::store();
        let entity = fixture::article(&mut store, "UUID-1", "Hello");
        let dump = Dumper::new(&store).dump(&entity).unwrap();

        assert!(diff_between_dumps(None, None).unwrap().is_none());
        assert!(diff_between_dumps(Some(&dump), Some(&dump)).unwrap().is_none());

        let added = diff_between_dumps(None, Some(&dump)).unwrap().unwrap();
        assert_eq!(added.active, ENTITY_ADDED);
        assert_eq!(added.lines[0], DiffLine::new(DiffTag::Delete, ENTITY_ADDED));

        let deleted = diff_between_dumps(Some(&dump), None).unwrap().unwrap();
        assert_eq!(deleted.staged, ENTITY_DELETED);
        assert!(deleted
            .lines
            .contains(&DiffLine::new(DiffTag::Insert, ENTITY_DELETED)));
    }

    #[test]
    fn test_diff_generator() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DumpStorage::new(temp_dir.path());
        let mut store = fixture::store();

        let same = fixture::article(&mut store, "UUID-1", "Same");
        let mut changed = fixture::article(&mut store, "UUID-2", "Before");
        {
            let dumper = Dumper::new(&store);
            storage.save(&dumper.dump(&same).unwrap()).unwrap();
            storage.save(&dumper.dump(&changed).unwrap()).unwrap();
        }
        let staged_only = {
            let mut other = fixture::store();
            let entity = fixture::article(&mut other, "UUID-3", "New");
            Dumper::new(&other).dump(&entity).unwrap()
        };
        storage.save(&staged_only).unwrap();

        let fields = serde_json::from_value(serde_json::json!({"title": "After"})).unwrap();
        store.overwrite(&mut changed, &fields).unwrap();
        store.save(&mut changed).unwrap();

        let diffs = DiffGenerator::new(&store, &storage).diff().unwrap();
        assert_eq!(diffs.len(), 3);
        assert!(diffs["node:article:UUID-1"].is_none());

        let changed_diff = diffs["node:article:UUID-2"].as_ref().unwrap();
        assert!(changed_diff
            .lines
            .contains(&DiffLine::new(DiffTag::Delete, "  title: After")));
        assert!(changed_diff
            .lines
            .contains(&DiffLine::new(DiffTag::Insert, "  title: Before")));

        let added = diffs["node:article:UUID-3"].as_ref().unwrap();
        assert_eq!(added.active, ENTITY_ADDED);
    }
}
