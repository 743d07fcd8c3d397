//! The model-document output variant: species plus stoichiometric
//! reactions, the representation the document writer serializes.

use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use crate::atoms;
use crate::pathway::{EntryId, Pathway, Reaction, ReactionComponent};
use crate::{OutputFormat, RunContext};

/// One materialized pathway entry in the model document.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Species {
    pub id: String,
    pub name: String,
}

/// A reactant or product slot of a [ModelReaction].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeciesReference {
    /// Id of the referenced [Species].
    pub species: String,
    pub stoichiometry: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelReaction {
    pub id: String,
    pub name: String,
    pub reversible: bool,
    pub reactants: Vec<SpeciesReference>,
    pub products: Vec<SpeciesReference>,
    /// Ids of the catalysing species.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modifiers: Vec<String>,
    /// Diagnostic notes, currently only the atom-balance result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The model document built from one pathway.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelDocument {
    pub id: String,
    pub name: String,
    pub species: Vec<Species>,
    pub reactions: Vec<ModelReaction>,
}

impl ModelDocument {
    pub fn species_by_id(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|species| species.id == id)
    }
}

/// The model-document output variant. Considers reactions only; the
/// regulatory relations belong to the qualitative variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDocumentFormat;

impl OutputFormat for ModelDocumentFormat {
    type Output = ModelDocument;

    fn considers_relations(&self) -> bool {
        false
    }

    fn considers_reactions(&self) -> bool {
        true
    }

    fn translate_core(&self, pathway: &Pathway, run: &mut RunContext<'_>) -> Result<ModelDocument> {
        let mut document = ModelDocument {
            id: run.ids.allocate(pathway.name()),
            name: pathway.title().to_owned(),
            species: Vec::new(),
            reactions: Vec::new(),
        };

        let mut species_for_entry: HashMap<EntryId, usize> = HashMap::new();
        for entry in pathway.entries() {
            let name = run.name_for_entry(entry);
            let id = run.ids.allocate(&name);
            species_for_entry.insert(entry.id, document.species.len());
            document.species.push(Species { id, name });
        }

        for reaction in pathway.reactions() {
            if !has_substrate_and_product(reaction, pathway, &species_for_entry) {
                debug!(
                    "reaction {} lacks a materialized substrate or product, skipping",
                    reaction.name
                );
                continue;
            }

            let id = run.ids.allocate(&reaction.name);
            let reactants =
                resolve_references(&reaction.substrates, pathway, &species_for_entry, &document);
            let products =
                resolve_references(&reaction.products, pathway, &species_for_entry, &document);

            let modifiers: Vec<String> = pathway
                .entries()
                .iter()
                .filter(|entry| entry.reaction.as_deref() == Some(reaction.name.as_str()))
                .filter_map(|entry| species_for_entry.get(&entry.id))
                .map(|&index| document.species[index].id.clone())
                .collect();

            let notes = if run.config().check_atom_balance && run.config().retrieve_annotations {
                atoms::balance_note(reaction, pathway, run.annotations())
            } else {
                None
            };

            document.reactions.push(ModelReaction {
                id,
                name: reaction.name.clone(),
                reversible: reaction.reversible,
                reactants,
                products,
                modifiers,
                notes,
            });
        }

        Ok(document)
    }
}

/// A reaction is only worth materializing when at least one substrate
/// and one product resolve to a species.
fn has_substrate_and_product(
    reaction: &Reaction,
    pathway: &Pathway,
    species_for_entry: &HashMap<EntryId, usize>,
) -> bool {
    let materialized = |components: &[ReactionComponent]| {
        components.iter().any(|component| {
            pathway
                .entry_for_component(component)
                .is_some_and(|entry| species_for_entry.contains_key(&entry.id))
        })
    };

    materialized(&reaction.substrates) && materialized(&reaction.products)
}

fn resolve_references(
    components: &[ReactionComponent],
    pathway: &Pathway,
    species_for_entry: &HashMap<EntryId, usize>,
    document: &ModelDocument,
) -> Vec<SpeciesReference> {
    components
        .iter()
        .filter_map(|component| {
            let entry = pathway.entry_for_component(component)?;
            let &index = species_for_entry.get(&entry.id)?;
            Some(SpeciesReference {
                species: document.species[index].id.clone(),
                stoichiometry: component.stoichiometry.unwrap_or(1),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranslatorConfig;
    use crate::annotation::{AnnotationRecord, MemoryAnnotations};
    use crate::pathway::{Entry, EntryType};

    fn hexokinase_pathway() -> Pathway {
        let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");
        pathway.add_entry(Entry::new(1, "cpd:C00031", EntryType::Compound));
        pathway.add_entry(Entry::new(2, "cpd:C00668", EntryType::Compound));
        let mut enzyme = Entry::new(3, "hsa:3098", EntryType::Gene);
        enzyme.reaction = Some("rn:R01786".to_owned());
        pathway.add_entry(enzyme);

        let mut reaction = Reaction::new("rn:R01786", false);
        let mut substrate = ReactionComponent::new("cpd:C00031");
        substrate.entry = Some(1);
        reaction.substrates.push(substrate);
        let mut product = ReactionComponent::new("cpd:C00668");
        product.entry = Some(2);
        product.stoichiometry = Some(2);
        reaction.products.push(product);
        pathway.add_reaction(reaction);
        pathway
    }

    #[test]
    fn translate_core_test() {
        let config = TranslatorConfig::offline();
        let annotations = MemoryAnnotations::new();
        let mut run = RunContext::new(&config, &annotations);

        let pathway = hexokinase_pathway();
        let document = ModelDocumentFormat.translate_core(&pathway, &mut run).unwrap();

        assert_eq!(document.species.len(), 3);
        assert_eq!(document.reactions.len(), 1);

        let reaction = &document.reactions[0];
        assert_eq!(reaction.name, "rn:R01786");
        assert_eq!(reaction.reactants.len(), 1);
        assert_eq!(reaction.reactants[0].stoichiometry, 1);
        assert_eq!(reaction.products[0].stoichiometry, 2);
        assert_eq!(reaction.modifiers.len(), 1);
        assert!(document.species_by_id(&reaction.modifiers[0]).is_some());
        assert!(reaction.notes.is_none());
    }

    #[test]
    fn incomplete_reaction_is_skipped() {
        let config = TranslatorConfig::offline();
        let annotations = MemoryAnnotations::new();
        let mut run = RunContext::new(&config, &annotations);

        let mut pathway = Pathway::new("path:hsa00010", "hsa", "Glycolysis");
        pathway.add_entry(Entry::new(1, "cpd:C00031", EntryType::Compound));
        let mut reaction = Reaction::new("rn:R01786", false);
        let mut substrate = ReactionComponent::new("cpd:C00031");
        substrate.entry = Some(1);
        reaction.substrates.push(substrate);
        // Product references an entry the pathway never contained.
        reaction.products.push(ReactionComponent::new("cpd:C00668"));
        pathway.add_reaction(reaction);

        let document = ModelDocumentFormat.translate_core(&pathway, &mut run).unwrap();
        assert!(document.reactions.is_empty());
    }

    #[test]
    fn atom_balance_note_test() {
        let config = TranslatorConfig {
            check_atom_balance: true,
            ..TranslatorConfig::default()
        };
        let mut annotations = MemoryAnnotations::new();
        annotations.insert(AnnotationRecord::found("cpd:C00031").with_formula("C6H12O6"));
        annotations.insert(AnnotationRecord::found("cpd:C00668").with_formula("C6H11O9P"));
        let mut run = RunContext::new(&config, &annotations);

        let pathway = hexokinase_pathway();
        let document = ModelDocumentFormat.translate_core(&pathway, &mut run).unwrap();

        let note = document.reactions[0].notes.as_deref().unwrap();
        assert!(note.contains("unbalanced reaction rn:R01786"));
    }
}
