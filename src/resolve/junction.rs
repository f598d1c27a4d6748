//! Many-to-many junction detection.
//!
//! An entity is a junction when it has no inheritance, its config does not
//! forbid it, and it carries exactly two simple, non self-referencing foreign
//! keys with either nothing else besides keys or an explicit `middle_table`
//! flag. The two sides are ordered by column position; a column override with
//! `inverse = true` on the left side swaps them.

use crate::model::{AssociationDirection, EntityId, MiddleLink, RelationKind};
use crate::naming;
use crate::resolve::relation::{
    add_relation, direction, forward_name, link_inverse, Candidate, RelationDraft,
};
use crate::resolve::ResolutionContext;

/// The (left, right) sides when `entity` is a junction
pub(crate) fn detect<'c, 'a>(
    ctx: &ResolutionContext<'_>,
    entity: EntityId,
    candidates: &[&'c Candidate<'a>],
) -> Option<(&'c Candidate<'a>, &'c Candidate<'a>)> {
    let project = &ctx.project;
    if project.entity(entity).has_inheritance() {
        return None;
    }
    let middle_table = ctx.entity_config(entity).and_then(|c| c.middle_table);
    if middle_table == Some(false) {
        return None;
    }
    let [first, second] = candidates else {
        return None;
    };
    if first.is_self_referencing() || second.is_self_referencing() {
        return None;
    }
    let plain = project
        .attributes_of(entity)
        .filter(|a| !a.in_primary_key && !a.in_foreign_key())
        .count();
    if middle_table != Some(true) && plain > 0 {
        return None;
    }
    if !first.is_simple() || !second.is_simple() {
        log::warn!(
            "entity '{}' looks like a junction over a composite foreign key, which is unsupported; mapping it as a plain entity",
            project.entity(entity).name
        );
        return None;
    }

    let position = |c: &Candidate<'_>| project.attribute(c.from[0]).column.ordinal_position;
    let (mut left, mut right) = if position(*first) <= position(*second) {
        (*first, *second)
    } else {
        (*second, *first)
    };
    if left.config().and_then(|c| c.inverse) == Some(true) {
        std::mem::swap(&mut left, &mut right);
    }
    Some((left, right))
}

/// Flag `entity` as a junction and emit its relations
pub(crate) fn build(
    ctx: &mut ResolutionContext<'_>,
    entity: EntityId,
    left: &Candidate<'_>,
    right: &Candidate<'_>,
) {
    let left_attribute = left.from[0];
    let right_attribute = right.from[0];
    let left_name = ctx.project.attribute(left_attribute).name().to_string();
    let right_name = ctx.project.attribute(right_attribute).name().to_string();

    let junction = ctx.project.entity_mut(entity);
    junction.is_many_to_many_join = true;
    log::info!(
        "entity '{}' is a junction between '{}' and '{}'",
        ctx.project.entity(entity).name,
        ctx.project.entity(left.target).name,
        ctx.project.entity(right.target).name
    );

    // the junction keeps a plain many-to-one to each side
    for side in [left, right] {
        let name = ctx.project.attribute(side.from[0]).name().to_string();
        add_relation(
            ctx,
            RelationDraft {
                kind: RelationKind::ManyToOne,
                from_entity: entity,
                to_entity: side.target,
                from_attributes: side.from.clone(),
                to_attributes: side.to.clone(),
                middle: None,
                accessor: forward_name(&name),
                config: None,
            },
        );
    }

    let left_config = left.config();
    let right_config = right.config();
    // read from the junction, which owns the whole association
    let bidirectional = direction(ctx, entity, &right.from) == AssociationDirection::Bidirectional;
    let middle = MiddleLink {
        entity,
        from_side: left_attribute,
        to_side: right_attribute,
    };
    let inverse_middle = MiddleLink {
        entity,
        from_side: right_attribute,
        to_side: left_attribute,
    };

    let (forward_kind, forward_accessor, forward_config, inverse_kind, inverse_config) =
        match right_config.and_then(|c| c.many_to_one_config.as_ref()) {
            None => (
                RelationKind::ManyToMany,
                naming::pluralize(&forward_name(&right_name)),
                right_config.and_then(|c| c.many_to_many_config.as_ref()),
                RelationKind::ManyToMany,
                left_config.and_then(|c| c.many_to_many_config.as_ref()),
            ),
            Some(many_to_one) => (
                RelationKind::ManyToOne,
                forward_name(&right_name),
                Some(many_to_one),
                RelationKind::OneToMany,
                left_config.and_then(|c| c.one_to_many_config.as_ref()),
            ),
        };

    let forward = add_relation(
        ctx,
        RelationDraft {
            kind: forward_kind,
            from_entity: left.target,
            to_entity: right.target,
            from_attributes: left.to.clone(),
            to_attributes: right.to.clone(),
            middle: Some(middle),
            accessor: forward_accessor,
            config: forward_config,
        },
    );
    if bidirectional || inverse_config.is_some() {
        let inverse = add_relation(
            ctx,
            RelationDraft {
                kind: inverse_kind,
                from_entity: right.target,
                to_entity: left.target,
                from_attributes: right.to.clone(),
                to_attributes: left.to.clone(),
                middle: Some(inverse_middle),
                accessor: naming::pluralize(&forward_name(&left_name)),
                config: inverse_config,
            },
        );
        link_inverse(ctx, forward, inverse);
    }
}
