//! Keep strengths and space resolution between adjacent block-level objects.

use crate::elements::{Element, GlueKind, INFINITE, Position};
use folio_style::{Conditionality, Keep, Length, Precedence, Space};
use folio_types::OwnerHandle;

/// Element index a node uses for the space it contributes.
pub const SPACE_INDEX: usize = usize::MAX;

/// Penalty cost of breaking against a keep condition.
pub fn keep_cost(keep: Keep) -> i32 {
    match keep {
        Keep::Auto => 0,
        Keep::Strength(n) => (n.saturating_mul(100)).min((INFINITE - 1) as u32) as i32,
        Keep::Always => INFINITE,
    }
}

/// Cost of the break between two siblings.
pub fn break_cost_between(keep_with_next: Keep, keep_with_previous: Keep) -> i32 {
    keep_cost(keep_with_next.max(keep_with_previous))
}

/// A space after resolution, with the node whose specifier won.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSpace {
    pub space: Space,
    pub kind: GlueKind,
    pub owner: OwnerHandle,
}

impl ResolvedSpace {
    /// The element standing for this space: a glue, or a box when retained.
    pub fn element(&self) -> Element {
        let position = Position::new(self.owner, SPACE_INDEX);
        let optimum = self.space.optimum.mpt();
        match self.space.conditionality {
            Conditionality::Retain => Element::boxed(optimum, None),
            Conditionality::Discard => Element::Glue {
                natural: optimum,
                stretch: self.space.maximum.mpt() - optimum,
                shrink: optimum - self.space.minimum.mpt(),
                kind: self.kind,
                position: Some(position),
            },
        }
    }
}

/// Resolves the space-after of one object against the space-before of the
/// next. Forcing specifiers win and add up; otherwise the highest precedence
/// wins, then the largest optimum.
pub fn resolve_spaces(
    after: Option<(Space, OwnerHandle)>,
    before: Option<(Space, OwnerHandle)>,
) -> Option<ResolvedSpace> {
    let after = after
        .filter(|(s, _)| !s.is_zero())
        .map(|(space, owner)| ResolvedSpace {
            space,
            kind: GlueKind::SpaceAfter,
            owner,
        });
    let before = before
        .filter(|(s, _)| !s.is_zero())
        .map(|(space, owner)| ResolvedSpace {
            space,
            kind: GlueKind::SpaceBefore,
            owner,
        });

    let (a, b) = match (after, before) {
        (None, None) => return None,
        (Some(one), None) | (None, Some(one)) => return Some(one),
        (Some(a), Some(b)) => (a, b),
    };

    let resolved = match (a.space.precedence, b.space.precedence) {
        (Precedence::Force, Precedence::Force) => ResolvedSpace {
            space: Space {
                minimum: Length(a.space.minimum.mpt() + b.space.minimum.mpt()),
                optimum: Length(a.space.optimum.mpt() + b.space.optimum.mpt()),
                maximum: Length(a.space.maximum.mpt() + b.space.maximum.mpt()),
                precedence: Precedence::Force,
                conditionality: if a.space.conditionality == Conditionality::Retain
                    || b.space.conditionality == Conditionality::Retain
                {
                    Conditionality::Retain
                } else {
                    Conditionality::Discard
                },
            },
            ..a
        },
        (Precedence::Force, _) => a,
        (_, Precedence::Force) => b,
        (Precedence::Level(pa), Precedence::Level(pb)) if pa != pb => {
            if pa > pb {
                a
            } else {
                b
            }
        }
        _ if a.space.optimum != b.space.optimum => {
            if a.space.optimum > b.space.optimum {
                a
            } else {
                b
            }
        }
        _ => {
            let mut merged = a;
            merged.space.minimum = a.space.minimum.max(b.space.minimum);
            merged.space.maximum = a.space.maximum.min(b.space.maximum);
            merged
        }
    };
    Some(resolved)
}
