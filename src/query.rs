use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;

/// Match-query expression attached to a query atom.
///
/// The tree owns everything it refers to, including recursive
/// sub-structures, so query molecules can be cloned and edited freely.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomQuery {
    /// Matches by atomic number (`#n`).
    AtomicNum(u8),
    /// Matches total hydrogen count, explicit neighbors included (`Hn`).
    TotalHCount(u8),
    /// Logical AND of sub-expressions.
    And(Vec<AtomQuery>),
    /// Logical OR of sub-expressions.
    Or(Vec<AtomQuery>),
    /// Logical NOT of a sub-expression.
    Not(Box<AtomQuery>),
    /// A recursive sub-structure query (`$(...)`) over its own molecule.
    Recursive(Mol<Atom, Bond>),
}

impl AtomQuery {
    pub fn negated(self) -> Self {
        AtomQuery::Not(Box::new(self))
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, AtomQuery::Not(_))
    }

    /// Direct sub-expressions (empty for leaves and recursive queries).
    pub fn children(&self) -> &[AtomQuery] {
        match self {
            AtomQuery::And(children) | AtomQuery::Or(children) => children,
            AtomQuery::Not(inner) => std::slice::from_ref(inner.as_ref()),
            _ => &[],
        }
    }

    /// Conjoin `extra` with this query, flattening into a top-level `And`.
    pub fn expand_and(&mut self, extra: AtomQuery) {
        match self {
            AtomQuery::And(children) => children.push(extra),
            _ => {
                let current = std::mem::replace(self, AtomQuery::And(Vec::new()));
                *self = AtomQuery::And(vec![current, extra]);
            }
        }
    }
}
