//! DAG builder, cycle detection, and wave computation for step dependencies.
//!
//! Uses `petgraph` to model step dependencies as a directed graph. Topological
//! sort detects cycles, and depth-based grouping produces waves where every
//! step only depends on steps from earlier waves.

use std::collections::{BTreeSet, HashMap};

use devflow_types::catalog::{StepId, StepTemplate};
use devflow_types::error::CatalogError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// Build the dependency graph with an edge from each dependency to its
/// dependent. Fails on references to unregistered steps.
fn build_graph(
    steps: &[StepTemplate],
) -> Result<(DiGraph<StepId, ()>, HashMap<StepId, NodeIndex>), CatalogError> {
    let mut graph = DiGraph::<StepId, ()>::new();
    let id_to_node: HashMap<StepId, NodeIndex> = steps
        .iter()
        .map(|s| (s.step_id, graph.add_node(s.step_id)))
        .collect();

    for step in steps {
        let to = id_to_node[&step.step_id];
        for dep in &step.dependencies {
            let from = id_to_node
                .get(dep)
                .ok_or(CatalogError::UnknownDependency {
                    step_id: step.step_id,
                    dependency: *dep,
                })?;
            graph.add_edge(*from, to, ());
        }
    }

    Ok((graph, id_to_node))
}

fn sorted_ids(graph: &DiGraph<StepId, ()>) -> Result<Vec<StepId>, CatalogError> {
    let sorted = toposort(graph, None)
        .map_err(|cycle| CatalogError::CycleDetected(graph[cycle.node_id()]))?;
    Ok(sorted.into_iter().map(|idx| graph[idx]).collect())
}

// ---------------------------------------------------------------------------
// Execution plan (wave computation)
// ---------------------------------------------------------------------------

/// Group steps into waves.
///
/// 1. Build a `DiGraph` with step IDs as nodes and dependency edges.
/// 2. Run `petgraph::algo::toposort` to verify acyclicity.
/// 3. Compute each node's depth (max dependency depth + 1).
/// 4. Group steps by depth; within a wave, IDs ascend.
///
/// Index 0 of the result holds the steps with no dependencies.
pub fn build_execution_plan(steps: &[StepTemplate]) -> Result<Vec<Vec<StepId>>, CatalogError> {
    if steps.is_empty() {
        return Ok(vec![]);
    }

    let (graph, _) = build_graph(steps)?;
    let order = sorted_ids(&graph)?;
    let id_to_step: HashMap<StepId, &StepTemplate> =
        steps.iter().map(|s| (s.step_id, s)).collect();

    // Root nodes have depth 0
    let mut depths: HashMap<StepId, usize> = HashMap::new();
    for step_id in order {
        let depth = id_to_step[&step_id]
            .dependencies
            .iter()
            .map(|dep| depths.get(dep).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        depths.insert(step_id, depth);
    }

    let max_depth = depths.values().copied().max().unwrap_or(0);
    let mut waves: Vec<Vec<StepId>> = vec![vec![]; max_depth + 1];
    for (step_id, depth) in &depths {
        waves[*depth].push(*step_id);
    }
    for wave in &mut waves {
        wave.sort_unstable();
    }

    Ok(waves)
}

// ---------------------------------------------------------------------------
// DAG validation (no wave computation)
// ---------------------------------------------------------------------------

/// Validate that steps form a DAG (no cycles, all references exist).
pub fn validate_dag(steps: &[StepTemplate]) -> Result<(), CatalogError> {
    let (graph, _) = build_graph(steps)?;
    sorted_ids(&graph)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transitive dependency closure
// ---------------------------------------------------------------------------

/// Returns every step that must finish before `step_id` can start, ascending.
///
/// Unregistered IDs (as the start or along the way) contribute nothing.
pub fn get_step_dependencies(step_id: StepId, steps: &[StepTemplate]) -> Vec<StepId> {
    let step_map: HashMap<StepId, &StepTemplate> = steps.iter().map(|s| (s.step_id, s)).collect();

    let mut visited = BTreeSet::new();
    let mut stack = vec![step_id];

    while let Some(current) = stack.pop() {
        if let Some(step) = step_map.get(&current) {
            for dep in &step.dependencies {
                if visited.insert(*dep) {
                    stack.push(*dep);
                }
            }
        }
    }

    visited.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
