//! Atom-balance checking for reactions, from the chemical formulas
//! of their substrate and product annotation records.

use std::collections::{BTreeMap, BTreeSet};

use crate::annotation::AnnotationLookup;
use crate::pathway::{Pathway, Reaction, ReactionComponent};

/// Compare the summed element counts of both reaction sides and
/// describe the imbalance, if any. Returns None when the reaction is
/// balanced or when a missing or unparsable formula makes the check
/// impossible.
pub(crate) fn balance_note(
    reaction: &Reaction,
    pathway: &Pathway,
    annotations: &dyn AnnotationLookup,
) -> Option<String> {
    let substrates = side_atoms(&reaction.substrates, pathway, annotations)?;
    let products = side_atoms(&reaction.products, pathway, annotations)?;

    if substrates == products {
        return None;
    }

    let elements: BTreeSet<&str> = substrates
        .keys()
        .chain(products.keys())
        .map(String::as_str)
        .collect();
    let differences: Vec<String> = elements
        .iter()
        .filter_map(|element| {
            let left = substrates.get(*element).copied().unwrap_or(0);
            let right = products.get(*element).copied().unwrap_or(0);
            (left != right).then(|| format!("{element} {left} vs {right}"))
        })
        .collect();

    Some(format!(
        "unbalanced reaction {}: {}",
        reaction.name,
        differences.join(", ")
    ))
}

/// Sum the element counts of one reaction side, weighted by
/// stoichiometry. None when any component lacks a usable formula.
fn side_atoms(
    components: &[ReactionComponent],
    pathway: &Pathway,
    annotations: &dyn AnnotationLookup,
) -> Option<BTreeMap<String, u32>> {
    let mut totals = BTreeMap::new();

    for component in components {
        let entry = pathway.entry_for_component(component)?;
        let identifier = entry.identifiers().next()?;
        let record = annotations.lookup(identifier);
        let atoms = parse_formula(record.formula.as_deref()?)?;

        let coefficient = component.stoichiometry.unwrap_or(1);
        for (element, count) in atoms {
            *totals.entry(element).or_insert(0) += count * coefficient;
        }
    }

    Some(totals)
}

/// Parse a molecular formula like "C6H12O6" into element counts.
/// Formulas with repeat groups or variables ("(C6H10O5)n") are not
/// countable and yield None.
pub(crate) fn parse_formula(formula: &str) -> Option<BTreeMap<String, u32>> {
    let mut atoms = BTreeMap::new();
    let mut chars = formula.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let mut element = String::from(c);
        while chars.peek().is_some_and(|c| c.is_ascii_lowercase()) {
            element.push(chars.next().unwrap_or_default());
        }

        let mut digits = String::new();
        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            digits.push(chars.next().unwrap_or_default());
        }
        let count = if digits.is_empty() { 1 } else { digits.parse().ok()? };

        *atoms.entry(element).or_insert(0) += count;
    }

    (!atoms.is_empty()).then_some(atoms)
}
