//! In-place pathway preprocessing, run before any output-specific
//! translation.
//!
//! The stage order is fixed: pathway-reference removal, annotation
//! prefetch, reaction autocompletion (followed by a second prefetch
//! for the entries it introduced), stoichiometry repair, generic-node
//! removal, orphan removal. A failed or empty annotation lookup never
//! aborts preprocessing; the affected entry or reaction simply
//! proceeds with reduced information.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::TranslatorConfig;
use crate::annotation::AnnotationLookup;
use crate::pathway::{Entry, EntryId, EntryType, Pathway, ReactionComponent};

pub(crate) fn preprocess(
    pathway: &mut Pathway,
    config: &TranslatorConfig,
    annotations: &dyn AnnotationLookup,
    considers_relations: bool,
    considers_reactions: bool,
) {
    let complete_reactions = considers_reactions && config.autocomplete_reactions;

    if config.retrieve_annotations {
        if config.remove_pathway_references {
            remove_pathway_references(pathway);
        }

        info!("prefetching annotation records for pathway {}", pathway.name());
        prefetch(pathway, annotations, complete_reactions);

        if complete_reactions {
            autocomplete_reactions(pathway, annotations);
            // Autocompletion introduces new entries, so prefetch again.
            prefetch(pathway, annotations, complete_reactions);
        }

        if considers_reactions {
            repair_stoichiometry(pathway, annotations);
        }
    }

    if config.remove_generic_nodes {
        remove_generic_entries(pathway);
    }

    // Always last, so autocompleted and filtered nodes are accounted for.
    if config.remove_orphans {
        remove_orphans(pathway, considers_relations, considers_reactions);
    }
}

fn remove_pathway_references(pathway: &mut Pathway) {
    let before = pathway.entries().len();
    pathway.retain_entries(|entry| !entry.references_pathway());
    let removed = before - pathway.entries().len();
    if removed > 0 {
        debug!("removed {removed} pathway-reference entries");
    }
}

/// Warm the annotation cache for every identifier in the pathway.
/// Purely a side-effect stage; the pathway is not touched.
fn prefetch(pathway: &Pathway, annotations: &dyn AnnotationLookup, include_reactions: bool) {
    let mut seen = HashSet::new();
    let mut identifiers: Vec<String> = Vec::new();
    let collect = |identifier: &str, seen: &mut HashSet<String>, out: &mut Vec<String>| {
        if seen.insert(identifier.to_owned()) {
            out.push(identifier.to_owned());
        }
    };

    for entry in pathway.entries() {
        for identifier in entry.identifiers() {
            collect(identifier, &mut seen, &mut identifiers);
        }
    }

    if include_reactions {
        for reaction in pathway.reactions() {
            collect(&reaction.name, &mut seen, &mut identifiers);
            for component in reaction.substrates.iter().chain(reaction.products.iter()) {
                collect(&component.name, &mut seen, &mut identifiers);
            }
        }
    }

    annotations.prefetch(&identifiers);
}

/// Complete every reaction with the substrates, products and enzymes
/// implied by its annotation record, creating entries for compounds
/// and enzymes the pathway does not contain yet.
fn autocomplete_reactions(pathway: &mut Pathway, annotations: &dyn AnnotationLookup) {
    // (reaction index, is product side, coefficient, compound id)
    let mut missing_components: Vec<(usize, bool, u32, String)> = Vec::new();
    let mut missing_enzymes: Vec<(String, String)> = Vec::new();

    for (index, reaction) in pathway.reactions().iter().enumerate() {
        let record = annotations.lookup(&reaction.name);
        if !record.success {
            debug!("no annotation record for reaction {}, not autocompleting", reaction.name);
            continue;
        }

        if let Some((substrates, products)) = record.equation.as_deref().and_then(parse_equation) {
            for (coefficient, compound) in substrates {
                if !reaction.substrates.iter().any(|c| c.matches_compound(&compound)) {
                    missing_components.push((index, false, coefficient, compound));
                }
            }
            for (coefficient, compound) in products {
                if !reaction.products.iter().any(|c| c.matches_compound(&compound)) {
                    missing_components.push((index, true, coefficient, compound));
                }
            }
        }

        for ec_code in &record.enzymes {
            let present = pathway.entries().iter().any(|entry| {
                entry.reaction.as_deref() == Some(reaction.name.as_str())
                    && entry
                        .name
                        .split_whitespace()
                        .any(|token| token == format!("ec:{ec_code}") || token == *ec_code)
            });
            if !present {
                missing_enzymes.push((reaction.name.clone(), ec_code.clone()));
            }
        }
    }

    for (index, is_product, coefficient, compound) in missing_components {
        let name = format!("cpd:{compound}");
        let entry_id = match pathway.entry_for_name(&name) {
            Some(entry) => entry.id,
            None => {
                let id = pathway.next_entry_id();
                debug!("autocompletion adds compound entry {name}");
                pathway.add_entry(Entry::new(id, &name, EntryType::Compound));
                id
            }
        };

        let component = ReactionComponent {
            name,
            entry: Some(entry_id),
            stoichiometry: Some(coefficient),
        };
        let reaction = &mut pathway.reactions_mut()[index];
        if is_product {
            reaction.products.push(component);
        } else {
            reaction.substrates.push(component);
        }
    }

    for (reaction_name, ec_code) in missing_enzymes {
        let id = pathway.next_entry_id();
        debug!("autocompletion adds enzyme ec:{ec_code} for reaction {reaction_name}");
        let mut entry = Entry::new(id, &format!("ec:{ec_code}"), EntryType::Enzyme);
        entry.reaction = Some(reaction_name);
        pathway.add_entry(entry);
    }
}

/// Fill in stoichiometric coefficients the markup leaves out, from
/// the textual equation of each reaction's annotation record.
fn repair_stoichiometry(pathway: &mut Pathway, annotations: &dyn AnnotationLookup) {
    for reaction in pathway.reactions_mut() {
        let record = annotations.lookup(&reaction.name);
        let Some((substrates, products)) = record.equation.as_deref().and_then(parse_equation)
        else {
            continue;
        };

        for component in &mut reaction.substrates {
            if component.stoichiometry.is_none() {
                if let Some((coefficient, _)) =
                    substrates.iter().find(|(_, id)| component.matches_compound(id))
                {
                    component.stoichiometry = Some(*coefficient);
                }
            }
        }
        for component in &mut reaction.products {
            if component.stoichiometry.is_none() {
                if let Some((coefficient, _)) =
                    products.iter().find(|(_, id)| component.matches_compound(id))
                {
                    component.stoichiometry = Some(*coefficient);
                }
            }
        }
    }
}

/// Parse a reaction equation like "2 C00668 + C00002 <=> C05345 +
/// C00008" into (substrates, products) coefficient/compound pairs.
fn parse_equation(equation: &str) -> Option<(Vec<(u32, String)>, Vec<(u32, String)>)> {
    let (left, right) = equation
        .split_once("<=>")
        .or_else(|| equation.split_once('='))?;
    Some((parse_equation_side(left), parse_equation_side(right)))
}

fn parse_equation_side(side: &str) -> Vec<(u32, String)> {
    let mut terms = Vec::new();

    for term in side.split(" + ") {
        let mut coefficient = 1;
        let mut compound = None;
        for token in term.split_whitespace() {
            if let Ok(count) = token.parse::<u32>() {
                coefficient = count;
            } else if token.chars().next().is_some_and(|c| c.is_ascii_uppercase())
                && token.chars().all(|c| c.is_ascii_alphanumeric())
            {
                compound = Some(token.to_owned());
            }
            // Anything else ("(n)", "n-1", ...) has no usable coefficient.
        }
        if let Some(compound) = compound {
            terms.push((coefficient, compound));
        }
    }

    terms
}

fn remove_generic_entries(pathway: &mut Pathway) {
    let before = pathway.entries().len();
    // Compounds are shared across species and are never generic.
    pathway.retain_entries(|entry| {
        entry.entry_type == EntryType::Compound || !entry.is_generic()
    });
    let removed = before - pathway.entries().len();
    if removed > 0 {
        debug!("removed {removed} generic entries");
    }
}

/// Remove entries with no incident relation or reaction. The orphan
/// test honors which edge kinds the active output variant considers;
/// connectedness propagates between groups and their members.
fn remove_orphans(
    pathway: &mut Pathway,
    considers_relations: bool,
    considers_reactions: bool,
) {
    let mut used: HashSet<EntryId> = HashSet::new();

    if considers_relations {
        for relation in pathway.relations() {
            used.insert(relation.entry1);
            used.insert(relation.entry2);
        }
    }

    if considers_reactions {
        for reaction in pathway.reactions() {
            for component in reaction.substrates.iter().chain(reaction.products.iter()) {
                if let Some(entry) = pathway.entry_for_component(component) {
                    used.insert(entry.id);
                }
            }
        }
        for entry in pathway.entries() {
            if entry
                .reaction
                .as_deref()
                .is_some_and(|name| pathway.has_reaction_named(name))
            {
                used.insert(entry.id);
            }
        }
    }

    loop {
        let mut changed = false;
        for entry in pathway.entries() {
            if !entry.is_group() {
                continue;
            }
            if !used.contains(&entry.id) && entry.components.iter().any(|id| used.contains(id)) {
                used.insert(entry.id);
                changed = true;
            }
            if used.contains(&entry.id) {
                for id in &entry.components {
                    if used.insert(*id) {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    let before = pathway.entries().len();
    pathway.retain_entries(|entry| used.contains(&entry.id));
    let removed = before - pathway.entries().len();
    if removed > 0 {
        debug!("removed {removed} orphan entries");
    }
}
