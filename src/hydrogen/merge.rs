use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use super::MergeQueryHsOptions;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::query::AtomQuery;

/// Whether atom `idx` is a hydrogen that can be folded into its neighbor's
/// query.
///
/// Plain hydrogens qualify, as do terminal query atoms whose query requires
/// atomic number 1 outside any negation. Queries that combine such a test
/// with an OR are not merged.
pub fn is_query_h(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    if atom.atomic_num == 1 && matches!(atom.query, None | Some(AtomQuery::AtomicNum(1))) {
        return true;
    }
    if mol.degree(idx) != 1 {
        return false;
    }
    let Some(query) = &atom.query else {
        return false;
    };
    if query.is_negated() {
        return false;
    }

    let mut has_h = matches!(query, AtomQuery::AtomicNum(1));
    let mut has_or = matches!(query, AtomQuery::Or(_));
    let mut pending: VecDeque<&AtomQuery> = query.children().iter().collect();
    while !(has_h && has_or) {
        let Some(node) = pending.pop_front() else {
            break;
        };
        match node {
            AtomQuery::Or(_) => has_or = true,
            AtomQuery::AtomicNum(1) => has_h = true,
            AtomQuery::And(children) => pending.extend(children),
            _ => {}
        }
    }
    if has_h && has_or {
        tracing::warn!(
            atom = idx.index(),
            "merging explicit H queries involved in ORs is not supported, query not merged"
        );
        return false;
    }
    has_h
}

/// Fold hydrogen atoms into hydrogen-count queries on their neighbors.
///
/// A neighbor that loses `n` hydrogens gains `!H0 & ... & !H(n-1)`, i.e. "at
/// least `n` hydrogens"; a neighbor without a query first gets one matching
/// its atomic number. Query molecules nested in recursive queries are merged
/// the same way. With `merge_unmapped_only`, hydrogens carrying an atom-map
/// number are kept.
pub fn merge_query_hs_in_place(mol: &mut Mol<Atom, Bond>, options: &MergeQueryHsOptions) {
    let mut worklist: Vec<&mut Mol<Atom, Bond>> = vec![mol];
    while let Some(current) = worklist.pop() {
        merge_level(current, options);

        let skip: Vec<bool> = current.atoms().map(|i| is_query_h(current, i)).collect();
        for (atom, skip) in current.atoms_mut().zip(skip) {
            if skip {
                continue;
            }
            if let Some(query) = atom.query.as_mut() {
                collect_recursive(query, &mut worklist);
            }
        }
    }
}

/// Non-destructive [`merge_query_hs_in_place`].
pub fn merge_query_hs(mol: &Mol<Atom, Bond>, options: &MergeQueryHsOptions) -> Mol<Atom, Bond> {
    let mut result = mol.clone();
    merge_query_hs_in_place(&mut result, options);
    result
}

fn merge_level(mol: &mut Mol<Atom, Bond>, options: &MergeQueryHsOptions) {
    let hydrogens: Vec<bool> = mol.atoms().map(|i| is_query_h(mol, i)).collect();
    let indices: Vec<NodeIndex> = mol.atoms().collect();

    let mut doomed = Vec::new();
    for idx in indices {
        if hydrogens[idx.index()] {
            continue;
        }
        let merged: Vec<NodeIndex> = mol
            .neighbors(idx)
            .filter(|n| hydrogens[n.index()])
            .filter(|&n| !options.merge_unmapped_only || mol.atom(n).map_num.is_none())
            .collect();
        if merged.is_empty() {
            continue;
        }

        let atom = mol.atom_mut(idx);
        let z = atom.atomic_num;
        let query = atom.query.get_or_insert(AtomQuery::AtomicNum(z));
        let count = u8::try_from(merged.len()).unwrap_or(u8::MAX);
        for i in 0..count {
            query.expand_and(AtomQuery::TotalHCount(i).negated());
        }
        doomed.extend(merged);
    }

    doomed.sort_unstable();
    doomed.dedup();
    tracing::debug!(merged = doomed.len(), "merging query hydrogens");
    for h in doomed.into_iter().rev() {
        mol.remove_atom(h);
    }
}

/// Push every molecule of a recursive query found under `root`.
fn collect_recursive<'a>(root: &'a mut AtomQuery, worklist: &mut Vec<&'a mut Mol<Atom, Bond>>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node {
            AtomQuery::And(children) | AtomQuery::Or(children) => stack.extend(children.iter_mut()),
            AtomQuery::Not(inner) => stack.push(&mut **inner),
            AtomQuery::Recursive(sub) => worklist.push(sub),
            AtomQuery::AtomicNum(_) | AtomQuery::TotalHCount(_) => {}
        }
    }
}
