//! Disjoint-set forest tracking which submissions have been linked.
//!
//! Each graph build creates a fresh forest sized to the submission count.
//! Indices stand in for submissions, so the structure is a flat arena of
//! parent and rank slots rather than a graph of references.

/// Union-find over `0..len` with path compression and union by rank.
///
/// # Examples
/// ```
/// use plagraph_core::DisjointSetForest;
///
/// let mut forest = DisjointSetForest::new(4);
/// assert!(forest.union(0, 1));
/// assert!(forest.union(1, 2));
/// assert!(!forest.union(0, 2));
/// assert!(forest.same_set(0, 2));
/// assert!(!forest.same_set(0, 3));
/// ```
#[derive(Clone, Debug)]
pub struct DisjointSetForest {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSetForest {
    /// Creates a forest where every index is its own root.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Returns the number of tracked indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns whether the forest tracks no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the canonical representative of `node`.
    ///
    /// Compresses the path from `node` to its root. Membership never changes.
    ///
    /// # Panics
    /// Panics when `node >= self.len()`.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Returns whether `left` and `right` share a representative.
    ///
    /// # Panics
    /// Panics when either index is out of range.
    pub fn same_set(&mut self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }

    /// Merges the sets containing `left` and `right`.
    ///
    /// Returns `false` when both already belong to the same set.
    ///
    /// # Panics
    /// Panics when either index is out of range.
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return false;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        true
    }

    /// Groups indices by representative.
    ///
    /// Groups appear in the order their first member is met while walking
    /// `0..len`, and members keep ascending index order.
    ///
    /// # Examples
    /// ```
    /// use plagraph_core::DisjointSetForest;
    ///
    /// let mut forest = DisjointSetForest::new(5);
    /// forest.union(3, 1);
    /// forest.union(4, 0);
    /// assert_eq!(forest.groups(), vec![vec![0, 4], vec![1, 3], vec![2]]);
    /// ```
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_for_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for index in 0..self.len() {
            let root = self.find(index);
            match slot_for_root[root] {
                Some(slot) => groups[slot].push(index),
                None => {
                    slot_for_root[root] = Some(groups.len());
                    groups.push(vec![index]);
                }
            }
        }
        groups
    }
}
