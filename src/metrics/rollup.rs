//! Bottom-up rollup of per-scope records over an explicit scope tree.
//!
//! Keys are dot-delimited namespace paths built by strict prefix extension,
//! so a key's parent is the key minus its final segment. A child folds into
//! its parent only when the parent key is itself present in the record;
//! contributions whose immediate parent is absent are dropped, they do not
//! skip to a more distant ancestor.
//!
//! Aggregation is a one-shot transformation: it consumes the raw record
//! type and returns a distinct aggregated type, so a second pass (which
//! would double-count) has no entry point.

use std::collections::HashMap;

use super::{Counts, LineTally, ScopeComplexity, ScopeLineCounts};

/// Complexity after the rollup pass, pure containers suppressed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatedComplexity(HashMap<String, Counts>);

impl AggregatedComplexity {
    pub fn get(&self, key: &str) -> Option<Counts> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Counts)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Line tallies after the rollup pass; every scope is retained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatedLineCounts(HashMap<String, LineTally>);

impl AggregatedLineCounts {
    pub fn get(&self, key: &str) -> Option<LineTally> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LineTally)> {
        self.0.iter()
    }
}

/// Roll complexity up the scope tree, then drop every scope with zero own
/// complexity. Pure containers vanish while their totals stay visible in
/// the nearest ancestor that had a recorded parent chain.
pub fn aggregate_complexity(raw: ScopeComplexity) -> AggregatedComplexity {
    let mut map = raw.0;
    fold_into_parents(&mut map, |parent, child| {
        parent.cumulative += child.cumulative;
    });
    map.retain(|_, counts| counts.own != 0);
    AggregatedComplexity(map)
}

/// Roll line tallies up the scope tree. Both counters fold; nothing is
/// suppressed.
pub fn aggregate_line_counts(raw: ScopeLineCounts) -> AggregatedLineCounts {
    let mut map = raw.0;
    fold_into_parents(&mut map, |parent, child| {
        parent.comment += child.comment;
        parent.logical += child.logical;
    });
    AggregatedLineCounts(map)
}

/// The parent of a dotted key, or `None` for the root key.
fn parent_key(key: &str) -> Option<&str> {
    if key.is_empty() {
        return None;
    }
    Some(key.rsplit_once('.').map(|(parent, _)| parent).unwrap_or(""))
}

/// Visit every key children-before-parents and fold each value into its
/// immediate parent when that parent exists.
fn fold_into_parents<V: Copy>(map: &mut HashMap<String, V>, fold: impl Fn(&mut V, V)) {
    for key in ScopeTree::build(map.keys()).post_order() {
        let Some(parent) = parent_key(&key) else {
            continue;
        };
        if !map.contains_key(parent) {
            continue;
        }
        let child_value = map[&key];
        let parent_value = map
            .get_mut(parent)
            .expect("parent presence checked above");
        fold(parent_value, child_value);
    }
}

/// Explicit forest over the present keys. Edges link a key to its immediate
/// string parent when both are present; everything else is a root.
struct ScopeTree {
    keys: Vec<String>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl ScopeTree {
    fn build<'a>(keys: impl Iterator<Item = &'a String>) -> Self {
        let keys: Vec<String> = keys.cloned().collect();
        let index: HashMap<&str, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.as_str(), i))
            .collect();

        let mut children = vec![Vec::new(); keys.len()];
        let mut roots = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            let parent = parent_key(key).and_then(|p| index.get(p).copied());
            match parent {
                Some(p) if p != i => children[p].push(i),
                _ => roots.push(i),
            }
        }

        Self {
            keys,
            children,
            roots,
        }
    }

    /// Depth-first post-order over the forest: children before parents.
    fn post_order(self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.keys.len());
        let mut stack: Vec<(usize, bool)> =
            self.roots.iter().rev().map(|&i| (i, false)).collect();

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(self.keys[node].clone());
                continue;
            }
            stack.push((node, true));
            for &child in &self.children[node] {
                stack.push((child, false));
            }
        }

        order
    }
}
