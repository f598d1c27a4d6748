//! Inheritance chain validation.
//!
//! Runs over the full list of planned entities before any column is bound:
//! parents are linked by name, chains are checked for self-inheritance and
//! cycles, every hierarchy settles on exactly one strategy, and children
//! without a table of their own inherit the root's table when the strategy
//! allows it.

use crate::error::{ResolveError, Result};
use crate::model::InheritanceStrategy;
use crate::resolve::entity::EntityPlan;

/// Link parents, validate chains and settle strategies in place
pub(crate) fn link(plans: &mut [EntityPlan<'_>]) -> Result<()> {
    link_parents(plans)?;
    let roots = find_roots(plans)?;
    for (plan, root) in plans.iter_mut().zip(&roots) {
        plan.root = *root;
    }
    settle_strategies(plans, &roots)?;
    fill_tables(plans, &roots)
}

fn link_parents(plans: &mut [EntityPlan<'_>]) -> Result<()> {
    for index in 0..plans.len() {
        let Some(parent_name) = plans[index]
            .config
            .filter(|c| c.has_parent())
            .and_then(|c| c.parent_name.as_deref())
        else {
            continue;
        };
        if parent_name.eq_ignore_ascii_case(&plans[index].name) {
            return Err(ResolveError::SelfInheritance {
                entity: plans[index].name.clone(),
            });
        }
        let parent = plans
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(parent_name))
            .ok_or_else(|| ResolveError::UnknownParent {
                entity: plans[index].name.clone(),
                parent: parent_name.to_string(),
            })?;
        plans[index].parent = Some(parent);
    }
    Ok(())
}

/// Root index of every plan; a chain longer than the plan count loops
fn find_roots(plans: &[EntityPlan<'_>]) -> Result<Vec<usize>> {
    let mut roots = Vec::with_capacity(plans.len());
    for (index, plan) in plans.iter().enumerate() {
        let mut current = index;
        let mut steps = 0;
        while let Some(parent) = plans[current].parent {
            steps += 1;
            if steps > plans.len() {
                return Err(ResolveError::InheritanceCycle {
                    entity: plan.name.clone(),
                });
            }
            current = parent;
        }
        roots.push(current);
    }
    Ok(roots)
}

fn settle_strategies(plans: &mut [EntityPlan<'_>], roots: &[usize]) -> Result<()> {
    for root in 0..plans.len() {
        if roots[root] != root {
            continue;
        }
        let members: Vec<usize> = (0..plans.len()).filter(|i| roots[*i] == root).collect();
        if members.len() == 1 {
            if plans[root].declared_strategy().is_some() {
                log::debug!(
                    "entity '{}' declares an inheritance strategy but has no children",
                    plans[root].name
                );
            }
            continue;
        }

        let strategy = plans[root]
            .declared_strategy()
            .or_else(|| members.iter().find_map(|m| plans[*m].declared_strategy()))
            .unwrap_or(InheritanceStrategy::SingleTable);

        for member in &members {
            if let Some(found) = plans[*member].declared_strategy() {
                if found != strategy {
                    return Err(ResolveError::InconsistentInheritance {
                        entity: plans[*member].name.clone(),
                        root: plans[root].name.clone(),
                        expected: strategy,
                        found,
                    });
                }
            }
            plans[*member].strategy = Some(strategy);
        }
        log::info!(
            "entity '{}' roots a {:?} hierarchy of {} entities",
            plans[root].name,
            strategy,
            members.len()
        );
    }
    Ok(())
}

fn fill_tables(plans: &mut [EntityPlan<'_>], roots: &[usize]) -> Result<()> {
    for index in 0..plans.len() {
        if plans[index].table.is_some() {
            continue;
        }
        let root = roots[index];
        match plans[index].strategy {
            Some(InheritanceStrategy::SingleTable) => {
                plans[index].table = plans[root].table;
            }
            Some(strategy) => {
                return Err(ResolveError::MissingChildTable {
                    entity: plans[index].name.clone(),
                    strategy,
                })
            }
            None => return Err(ResolveError::MissingTableOrParent { index }),
        }
    }
    Ok(())
}
