//! Mapping from relation subtype tags to systems-biology ontology
//! term codes.

/// A numeric ontology (SBO) term code.
pub type OntologyTerm = u32;

/// The generic "control" term, parent of activation and inhibition.
pub const CONTROL: OntologyTerm = 168;

static SUBTYPE_TERMS: phf::Map<&'static str, OntologyTerm> = phf::phf_map! {
    "activation" => 170,          // stimulation
    "association" => 177,         // non-covalent binding
    "binding" => 177,
    "binding/association" => 177,
    "dephosphorylation" => 330,
    "dissociation" => 177,
    "expression" => 170,
    "glycosylation" => 217,
    "indirect effect" => 344,     // molecular interaction
    "inhibition" => 169,
    "methylation" => 214,
    "missing interaction" => 396, // uncertain process
    "phosphorylation" => 216,
    "repression" => 169,
    "state change" => 168,        // control
    "ubiquitination" => 224,
};

/// Return the ontology term for a relation subtype tag, or None for
/// tags outside the mapped vocabulary.
pub fn term_for(subtype_tag: &str) -> Option<OntologyTerm> {
    SUBTYPE_TERMS.get(subtype_tag).copied()
}

/// Format a term code as an accession, e.g. 177 to "SBO:0000177".
pub fn term_accession(term: OntologyTerm) -> String {
    format!("SBO:{term:07}")
}

/// Format a term code as a registry URN for cross-reference
/// annotations.
pub fn term_urn(term: OntologyTerm) -> String {
    format!("urn:miriam:biomodels.sbo:SBO%3A{term:07}")
}
