//! The qualitative/logical output variant: every entry becomes a
//! qualitative species and every relation a directed [Transition]
//! with a sign and an ontology term.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use tracing::debug;

use crate::ontology::{self, OntologyTerm};
use crate::pathway::{EntryId, Pathway, Relation, subtype};
use crate::{OutputFormat, RunContext};

/// The regulatory sign of a transition.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
    Dual,
    Unknown,
}

/// How a transition reads its input species.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputEffect {
    None,
    Consumption,
}

/// How a transition writes its output species.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputEffect {
    Production,
    AssignmentLevel,
}

/// One materialized pathway entry in the qualitative model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QualSpecies {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransitionInput {
    pub id: String,
    /// Id of the input [QualSpecies].
    pub species: String,
    pub effect: InputEffect,
    pub sign: Sign,
    /// Ontology term describing how the input acts, when one of the
    /// sign-determining subtype classes matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<OntologyTerm>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutput {
    pub id: String,
    /// Id of the output [QualSpecies].
    pub species: String,
    pub effect: OutputEffect,
}

/// A logical-model edge derived from one pathway [Relation].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub input: TransitionInput,
    pub output: TransitionOutput,
    /// The single best-fit ontology term of the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<OntologyTerm>,
    /// Registry URNs for every ontology term implied by the
    /// relation's subtype tags.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub xrefs: Vec<String>,
}

/// The qualitative model built from one pathway.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct QualModel {
    pub id: String,
    pub name: String,
    pub species: Vec<QualSpecies>,
    pub transitions: Vec<Transition>,
}

impl QualModel {
    pub fn species_by_id(&self, id: &str) -> Option<&QualSpecies> {
        self.species.iter().find(|species| species.id == id)
    }
}

/// Build the transition for one relation, or return None when an
/// endpoint entry was never materialized (e.g. filtered out during
/// preprocessing) or an identical transition already exists in this
/// run. Both are expected, non-fatal conditions.
pub(crate) fn build_transition(
    relation: &Relation,
    model: &mut QualModel,
    species_for_entry: &HashMap<EntryId, usize>,
    run: &mut RunContext<'_>,
) -> Option<usize> {
    let species_id = |entry: EntryId| {
        species_for_entry
            .get(&entry)
            .map(|&index| model.species[index].id.clone())
    };

    let (Some(input_species), Some(output_species)) =
        (species_id(relation.entry1), species_id(relation.entry2))
    else {
        debug!(
            "relation {} -> {} references an unknown or removed entry, skipping",
            relation.entry1, relation.entry2
        );
        return None;
    };

    let transition_id = run.ids.allocate("tr");
    let input_id = run.ids.allocate("in");
    let output_id = run.ids.allocate("out");

    let mut sign = Sign::Unknown;
    let mut input_term = None;
    let mut terms: BTreeSet<OntologyTerm> = BTreeSet::new();

    if !relation.subtypes.is_empty() {
        let inhibiting =
            relation.has_subtype(subtype::INHIBITION) || relation.has_subtype(subtype::REPRESSION);
        let activating =
            relation.has_subtype(subtype::ACTIVATION) || relation.has_subtype(subtype::EXPRESSION);

        if inhibiting && activating {
            sign = Sign::Dual;
            // Control is the parent of inhibition and activation.
            input_term = Some(ontology::CONTROL);
            terms.insert(ontology::CONTROL);
        } else if inhibiting {
            sign = Sign::Negative;
            input_term = ontology::term_for(subtype::INHIBITION);
        } else if activating {
            sign = Sign::Positive;
            input_term = ontology::term_for(subtype::ACTIVATION);
        } else if relation.has_subtype(subtype::STATE_CHANGE) {
            input_term = ontology::term_for(subtype::STATE_CHANGE);
        }

        for tag in &relation.subtypes {
            if let Some(term) = ontology::term_for(tag) {
                terms.insert(term);
            }
        }
    }

    let xrefs: Vec<String> = terms.iter().map(|&term| ontology::term_urn(term)).collect();
    let term = reduce_terms(&terms);

    let key = (
        input_species.clone(),
        output_species.clone(),
        term.map(ontology::term_accession).unwrap_or_default(),
    );
    if !run.note_transition(key) {
        debug!(
            "duplicate transition {input_species} -> {output_species}, discarding"
        );
        return None;
    }

    let transition = Transition {
        id: transition_id,
        input: TransitionInput {
            id: input_id,
            species: input_species,
            effect: InputEffect::None,
            sign,
            term: input_term,
        },
        output: TransitionOutput {
            id: output_id,
            species: output_species,
            effect: OutputEffect::AssignmentLevel,
        },
        term,
        xrefs,
    };

    model.transitions.push(transition);
    Some(model.transitions.len() - 1)
}

/// Reduce the collected ontology terms to the single best fit by
/// discarding unspecific terms in fixed order until one candidate
/// remains. If the reduction does not converge, the smallest
/// remaining code wins, which keeps the result deterministic.
fn reduce_terms(terms: &BTreeSet<OntologyTerm>) -> Option<OntologyTerm> {
    let mut remaining = terms.clone();

    let discard_order: [&[&str]; 5] = [
        &[subtype::MISSING_INTERACTION],
        &[subtype::ACTIVATION, subtype::INHIBITION],
        &[subtype::STATE_CHANGE],
        &[subtype::BINDING_ASSOCIATION],
        &[subtype::INDIRECT_EFFECT],
    ];

    for tags in discard_order {
        if remaining.len() <= 1 {
            break;
        }
        for tag in tags {
            if let Some(term) = ontology::term_for(tag) {
                remaining.remove(&term);
            }
        }
    }

    remaining.iter().next().copied()
}

/// The qualitative-model output variant. Considers relations only;
/// reactions play no role in the logical model.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualitativeModelFormat;

impl OutputFormat for QualitativeModelFormat {
    type Output = QualModel;

    fn considers_relations(&self) -> bool {
        true
    }

    fn considers_reactions(&self) -> bool {
        false
    }

    fn translate_core(&self, pathway: &Pathway, run: &mut RunContext<'_>) -> Result<QualModel> {
        let mut model = QualModel {
            id: run.ids.allocate(pathway.name()),
            name: pathway.title().to_owned(),
            species: Vec::new(),
            transitions: Vec::new(),
        };

        let mut species_for_entry: HashMap<EntryId, usize> = HashMap::new();
        for entry in pathway.entries() {
            let name = run.name_for_entry(entry);
            let id = run.ids.allocate(&name);
            species_for_entry.insert(entry.id, model.species.len());
            model.species.push(QualSpecies { id, name });
        }

        if pathway.relations().is_empty() {
            debug!("pathway contains no relations, the model will have no transitions");
        }
        for relation in pathway.relations() {
            build_transition(relation, &mut model, &species_for_entry, run);
        }

        Ok(model)
    }
}
