// src/dag/graph.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, TaskgateError};
use crate::model::{Task, TaskId};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies that are themselves nodes of this graph.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskId>,
}

/// Adjacency view of task dependencies keyed by task id.
///
/// Edges pointing at tasks outside the graph are dropped: they cannot
/// constrain anything inside it. Unlike a validated config, task rows can
/// carry cycles, so acyclicity is checked on demand with
/// [`DependencyGraph::check_acyclic`].
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<TaskId, DagNode>,
}

impl DependencyGraph {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::default();
        let tasks: Vec<&Task> = tasks.into_iter().collect();

        for task in &tasks {
            graph.nodes.entry(task.id).or_default();
        }
        for task in &tasks {
            graph.set_dependencies(task.id, &task.dependencies);
        }

        graph
    }

    /// Replace the outgoing dependency edges of `task`.
    ///
    /// Used to evaluate a proposed dependency edit before it is written.
    pub fn set_dependencies(&mut self, task: TaskId, deps: &[TaskId]) {
        let old = std::mem::take(&mut self.nodes.entry(task).or_default().deps);
        for dep in old {
            if let Some(node) = self.nodes.get_mut(&dep) {
                node.dependents.retain(|d| *d != task);
            }
        }

        let mut kept = Vec::new();
        for dep in deps {
            if kept.contains(dep) {
                continue;
            }
            // Self-edges are kept so the cycle check reports them.
            if let Some(node) = self.nodes.get_mut(dep) {
                node.dependents.push(task);
                kept.push(*dep);
            }
        }

        if let Some(node) = self.nodes.get_mut(&task) {
            node.deps = kept;
        }
    }

    /// Return all task ids in ascending order.
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn dependencies_of(&self, task: TaskId) -> &[TaskId] {
        self.nodes
            .get(&task)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    pub fn dependents_of(&self, task: TaskId) -> &[TaskId] {
        self.nodes
            .get(&task)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Dependencies first. Fails with `CycleDetected` on a cycle.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        // Edge direction: dep -> task
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();

        for id in self.nodes.keys() {
            graph.add_node(*id);
        }
        for (id, node) in self.nodes.iter() {
            for dep in node.deps.iter() {
                graph.add_edge(*dep, *id, ());
            }
        }

        toposort(&graph, None).map_err(|cycle| TaskgateError::CycleDetected(cycle.node_id()))
    }

    pub fn check_acyclic(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }
}
