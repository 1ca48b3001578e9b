//! Dominator and post-dominator tree computation.
//!
//! # Theory
//!
//! A block `d` **dominates** a block `n` if every path from the entry to `n`
//! must pass through `d`. The **immediate dominator** of `n` is the unique
//! block that strictly dominates `n` but no other strict dominator of `n`.
//! Post-dominance is the same relation on the reversed graph, rooted at a
//! virtual exit that every function exit feeds into.
//!
//! # Algorithm
//!
//! Lengauer-Tarjan with path compression, O(V α(V)) over the block count.
//! Blocks are function-local indices; predecessors are taken from the CFG
//! rather than rescanned.

/// Dominator tree of one function's CFG.
///
/// Unreachable blocks have no dominator and dominate nothing.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    entry: usize,
    idom: Vec<usize>,
}

const UNDEFINED: usize = usize::MAX;

impl DominatorTree {
    /// Computes the dominator tree over `succs`/`preds` rooted at `entry`.
    #[must_use]
    pub fn compute(succs: &[Vec<usize>], preds: &[Vec<usize>], entry: usize) -> Self {
        let node_count = succs.len();
        if node_count == 0 {
            return DominatorTree {
                entry,
                idom: Vec::new(),
            };
        }
        let mut lt = LengauerTarjan::new(node_count, entry);
        lt.compute(succs, preds);
        DominatorTree {
            entry,
            idom: lt.idom,
        }
    }

    /// The entry (root) block of the tree.
    #[must_use]
    pub fn entry(&self) -> usize {
        self.entry
    }

    /// The immediate dominator of `block`, or `None` for the entry and for
    /// unreachable blocks.
    #[must_use]
    pub fn immediate_dominator(&self, block: usize) -> Option<usize> {
        if block == self.entry {
            return None;
        }
        match self.idom.get(block) {
            Some(&idom) if idom != UNDEFINED => Some(idom),
            _ => None,
        }
    }

    /// Whether `a` dominates `b`. A block dominates itself.
    #[must_use]
    pub fn dominates(&self, a: usize, b: usize) -> bool {
        if a == b {
            return true;
        }
        let mut current = b;
        while current != self.entry {
            let Some(&idom) = self.idom.get(current) else {
                return false;
            };
            if idom == UNDEFINED {
                return false;
            }
            if idom == a {
                return true;
            }
            current = idom;
        }
        a == self.entry
    }

    /// Whether `a` dominates `b` and `a != b`.
    #[must_use]
    pub fn strictly_dominates(&self, a: usize, b: usize) -> bool {
        a != b && self.dominates(a, b)
    }
}

/// Post-dominator tree: dominance on the reversed CFG, rooted at a virtual
/// exit joined to every block without successors.
#[derive(Debug, Clone)]
pub struct PostDominatorTree {
    tree: DominatorTree,
    virtual_exit: usize,
}

impl PostDominatorTree {
    /// Computes the post-dominator tree over `succs`/`preds`.
    #[must_use]
    pub fn compute(succs: &[Vec<usize>], preds: &[Vec<usize>]) -> Self {
        let node_count = succs.len();
        let virtual_exit = node_count;

        // Reverse the graph and add the virtual exit.
        let mut rsuccs: Vec<Vec<usize>> = vec![Vec::new(); node_count + 1];
        let mut rpreds: Vec<Vec<usize>> = vec![Vec::new(); node_count + 1];
        for block in 0..node_count {
            rsuccs[block] = preds[block].clone();
            rpreds[block] = succs[block].clone();
            if succs[block].is_empty() {
                rsuccs[virtual_exit].push(block);
                rpreds[block].push(virtual_exit);
            }
        }

        PostDominatorTree {
            tree: DominatorTree::compute(&rsuccs, &rpreds, virtual_exit),
            virtual_exit,
        }
    }

    /// The immediate post-dominator of `block`, or `None` when it is the
    /// virtual exit.
    #[must_use]
    pub fn immediate_post_dominator(&self, block: usize) -> Option<usize> {
        match self.tree.immediate_dominator(block) {
            Some(idom) if idom != self.virtual_exit => Some(idom),
            _ => None,
        }
    }

    /// Whether `a` post-dominates `b`.
    #[must_use]
    pub fn post_dominates(&self, a: usize, b: usize) -> bool {
        self.tree.dominates(a, b)
    }
}

/// Internal state for the Lengauer-Tarjan algorithm.
struct LengauerTarjan {
    /// DFS number for each node (0 = not visited)
    dfnum: Vec<usize>,
    /// Node with each DFS number (inverse of dfnum)
    vertex: Vec<usize>,
    /// Parent in DFS tree
    parent: Vec<usize>,
    /// Semidominator (stored as node index)
    semi: Vec<usize>,
    /// Immediate dominator (final result)
    idom: Vec<usize>,
    /// Ancestor in the forest for link-eval
    ancestor: Vec<usize>,
    /// Best node on path to ancestor (for path compression)
    best: Vec<usize>,
    /// Bucket for each node (nodes whose semidominator is this node)
    bucket: Vec<Vec<usize>>,
    /// Current DFS counter
    dfs_counter: usize,
    entry: usize,
}

impl LengauerTarjan {
    fn new(n: usize, entry: usize) -> Self {
        LengauerTarjan {
            dfnum: vec![0; n],
            vertex: vec![UNDEFINED; n],
            parent: vec![UNDEFINED; n],
            semi: (0..n).collect(),
            idom: vec![UNDEFINED; n],
            ancestor: vec![UNDEFINED; n],
            best: (0..n).collect(),
            bucket: vec![Vec::new(); n],
            dfs_counter: 0,
            entry,
        }
    }

    fn compute(&mut self, succs: &[Vec<usize>], preds: &[Vec<usize>]) {
        // Phase 1: DFS numbering.
        self.dfs(succs);

        // Process nodes in reverse DFS order (excluding the entry).
        for i in (1..self.dfs_counter).rev() {
            let w = self.vertex[i];
            let parent_w = self.parent[w];

            // Phase 2: compute semidominators.
            for &v in &preds[w] {
                if self.dfnum[v] == 0 {
                    // Unreachable predecessor.
                    continue;
                }
                let u = self.eval(v);
                if self.dfnum[self.semi[u]] < self.dfnum[self.semi[w]] {
                    self.semi[w] = self.semi[u];
                }
            }

            let semi_w = self.semi[w];
            self.bucket[semi_w].push(w);
            self.link(parent_w, w);

            // Phase 3: implicit immediate dominators.
            let bucket = std::mem::take(&mut self.bucket[parent_w]);
            for v in bucket {
                let u = self.eval(v);
                self.idom[v] = if self.semi[u] == self.semi[v] {
                    parent_w
                } else {
                    u
                };
            }
        }

        // Phase 4: explicit immediate dominators.
        for i in 1..self.dfs_counter {
            let w = self.vertex[i];
            if self.idom[w] != self.semi[w] {
                self.idom[w] = self.idom[self.idom[w]];
            }
        }

        self.idom[self.entry] = self.entry;
    }

    fn dfs(&mut self, succs: &[Vec<usize>]) {
        let mut stack = vec![self.entry];
        while let Some(node) = stack.pop() {
            if self.dfnum[node] != 0 {
                continue;
            }
            self.dfs_counter += 1;
            self.dfnum[node] = self.dfs_counter;
            self.vertex[self.dfs_counter - 1] = node;

            for &succ in &succs[node] {
                if self.dfnum[succ] == 0 {
                    self.parent[succ] = node;
                    stack.push(succ);
                }
            }
        }
    }

    fn link(&mut self, w: usize, v: usize) {
        self.ancestor[v] = w;
    }

    /// Find the node with minimum semidominator on the path to the root.
    fn eval(&mut self, v: usize) -> usize {
        if self.ancestor[v] == UNDEFINED {
            return v;
        }
        self.compress(v);
        self.best[v]
    }

    /// Path compression for the forest, iterative to bound stack depth.
    fn compress(&mut self, v: usize) {
        let mut path = Vec::new();
        let mut current = v;
        while self.ancestor[self.ancestor[current]] != UNDEFINED {
            path.push(current);
            current = self.ancestor[current];
        }
        for &node in path.iter().rev() {
            let ancestor = self.ancestor[node];
            let best_ancestor = self.best[ancestor];
            if self.dfnum[self.semi[best_ancestor]] < self.dfnum[self.semi[self.best[node]]] {
                self.best[node] = best_ancestor;
            }
            self.ancestor[node] = self.ancestor[ancestor];
        }
    }
}
