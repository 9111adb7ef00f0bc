//! Action graph types and operations
//!
//! The graph is the solver's output, consumed read-only by the apply
//! engine. Edges run from a prerequisite action to an action that
//! depends on it; the graph must be acyclic.

use garnet_errors::{Error, PackageError};
use garnet_types::Action;
use std::collections::{BTreeSet, VecDeque};

/// DAG of plan actions, indexed by insertion order
#[derive(Debug, Clone, Default)]
pub struct ActionGraph {
    nodes: Vec<Action>,
    /// Adjacency list: prerequisite index -> dependent indices
    dependents: Vec<Vec<usize>>,
}

impl ActionGraph {
    /// Create a new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its index
    pub fn add_node(&mut self, action: Action) -> usize {
        self.nodes.push(action);
        self.dependents.push(Vec::new());
        self.nodes.len() - 1
    }

    /// Add an edge from a prerequisite to a dependent action
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn add_edge(&mut self, prerequisite: usize, dependent: usize) {
        assert!(prerequisite < self.nodes.len() && dependent < self.nodes.len());
        if !self.dependents[prerequisite].contains(&dependent) {
            self.dependents[prerequisite].push(dependent);
        }
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The action at `index`
    #[must_use]
    pub fn node(&self, index: usize) -> &Action {
        &self.nodes[index]
    }

    /// All actions in insertion order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.nodes
    }

    /// Dependent indices of a node
    #[must_use]
    pub fn dependents(&self, index: usize) -> &[usize] {
        &self.dependents[index]
    }

    /// Predecessor lists, one per node
    #[must_use]
    pub fn predecessors(&self) -> Vec<Vec<usize>> {
        let mut preds = vec![Vec::new(); self.nodes.len()];
        for (from, deps) in self.dependents.iter().enumerate() {
            for &to in deps {
                preds[to].push(from);
            }
        }
        preds
    }

    /// In-degree of every node
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for deps in &self.dependents {
            for &to in deps {
                degrees[to] += 1;
            }
        }
        degrees
    }

    /// Check for cycles using DFS
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut rec_stack = vec![false; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if !visited[start] && self.has_cycle_util(start, &mut visited, &mut rec_stack) {
                return true;
            }
        }

        false
    }

    fn has_cycle_util(&self, node: usize, visited: &mut [bool], rec_stack: &mut [bool]) -> bool {
        visited[node] = true;
        rec_stack[node] = true;

        for &dep in &self.dependents[node] {
            if !visited[dep] && self.has_cycle_util(dep, visited, rec_stack) {
                return true;
            }
            if rec_stack[dep] {
                return true;
            }
        }

        rec_stack[node] = false;
        false
    }

    /// Perform topological sort using Kahn's algorithm
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains a cycle.
    pub fn topological_sort(&self) -> Result<Vec<usize>, Error> {
        let mut in_degree = self.in_degrees();

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| if d == 0 { Some(i) } else { None })
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());

        while let Some(node) = queue.pop_front() {
            result.push(node);

            for &dep in &self.dependents[node] {
                in_degree[dep] -= 1;
                if in_degree[dep] == 0 {
                    queue.push_back(dep);
                }
            }
        }

        if result.len() != self.nodes.len() {
            return Err(PackageError::DependencyCycle {
                package: self
                    .nodes
                    .first()
                    .map_or_else(|| "unknown".to_string(), |a| a.package().name.clone()),
            }
            .into());
        }

        Ok(result)
    }

    /// Strict descendants of a node (everything reachable through
    /// dependent edges, excluding the node itself)
    #[must_use]
    pub fn descendants(&self, index: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = self.dependents[index].clone();

        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(self.dependents[node].iter().copied());
            }
        }

        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_types::{PackageId, Version};

    fn install(name: &str) -> Action {
        Action::install(PackageId::new(name, Version::parse("1.0.0").unwrap()))
    }

    fn chain_graph() -> (ActionGraph, usize, usize, usize) {
        let mut graph = ActionGraph::new();
        let a = graph.add_node(install("a"));
        let b = graph.add_node(install("b"));
        let c = graph.add_node(install("c"));
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        (graph, a, b, c)
    }

    #[test]
    fn test_topological_sort() {
        let (graph, a, b, c) = chain_graph();
        let sorted = graph.topological_sort().unwrap();

        let pos = |n| sorted.iter().position(|&i| i == n).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(b) < pos(c));
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = ActionGraph::new();
        let a = graph.add_node(install("a"));
        let b = graph.add_node(install("b"));

        assert!(!graph.has_cycles());

        graph.add_edge(a, b);
        graph.add_edge(b, a);

        assert!(graph.has_cycles());
        assert!(graph.topological_sort().is_err());
    }

    #[test]
    fn test_descendants() {
        let (graph, a, b, c) = chain_graph();

        assert_eq!(graph.descendants(a), [b, c].into_iter().collect());
        assert_eq!(graph.descendants(c), BTreeSet::new());
    }

    #[test]
    fn test_in_degrees_and_predecessors() {
        let (graph, a, b, c) = chain_graph();

        assert_eq!(graph.in_degrees(), vec![0, 1, 1]);
        let preds = graph.predecessors();
        assert!(preds[a].is_empty());
        assert_eq!(preds[b], vec![a]);
        assert_eq!(preds[c], vec![b]);
    }
}
