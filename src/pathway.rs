//! The in-memory representation of a parsed biological pathway.
//!
//! [Pathway] closely matches the pathway-markup input, containing
//! [Entry], [Relation] and [Reaction] structs. The upstream markup
//! parser builds a `Pathway`; the preprocessing stages in
//! [crate::preprocess] then mutate it in place before an output
//! variant walks it.

use std::collections::HashSet;

/// Pathway-local entry id, unique within one [Pathway].
pub type EntryId = u32;

/// The relation subtype vocabulary of the pathway-markup format.
pub mod subtype {
    pub const ACTIVATION: &str = "activation";
    pub const ASSOCIATION: &str = "association";
    pub const BINDING: &str = "binding";
    pub const BINDING_ASSOCIATION: &str = "binding/association";
    pub const DEPHOSPHORYLATION: &str = "dephosphorylation";
    pub const DISSOCIATION: &str = "dissociation";
    pub const EXPRESSION: &str = "expression";
    pub const GLYCOSYLATION: &str = "glycosylation";
    pub const INDIRECT_EFFECT: &str = "indirect effect";
    pub const INHIBITION: &str = "inhibition";
    pub const METHYLATION: &str = "methylation";
    pub const MISSING_INTERACTION: &str = "missing interaction";
    pub const PHOSPHORYLATION: &str = "phosphorylation";
    pub const REPRESSION: &str = "repression";
    pub const STATE_CHANGE: &str = "state change";
    pub const UBIQUITINATION: &str = "ubiquitination";
}

/// The type attribute of an [Entry].
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Gene,
    Ortholog,
    Enzyme,
    Compound,
    Map,
    Group,
    Other,
}

/// Rendering attributes of an [Entry].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Graphics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
}

/// Background color the markup format assigns to entries that do not
/// occur in the species of interest.
const GENERIC_BGCOLOR: &str = "#ffffff";

/// One node of the pathway graph: a gene, compound, enzyme, map
/// reference or group.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    /// One or more space-separated biological identifiers, or the
    /// group marker "undefined".
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Name of the reaction this entry catalyses, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphics: Option<Graphics>,
    /// Member entry ids, for group nodes.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub components: Vec<EntryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<EntryId>,
}

impl Entry {
    pub fn new(id: EntryId, name: &str, entry_type: EntryType) -> Entry {
        Entry {
            id,
            name: name.to_owned(),
            entry_type,
            reaction: None,
            graphics: None,
            components: Vec::new(),
            parent_group: None,
        }
    }

    /// Return true if this entry is a group node with members.
    pub fn is_group(&self) -> bool {
        (self.entry_type == EntryType::Group
            || self.name.trim().to_lowercase().starts_with("group:"))
            && !self.components.is_empty()
    }

    /// The biological identifiers referenced by this entry. Group
    /// marker entries reference nothing.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        let group = !self.components.is_empty();
        self.name
            .split_whitespace()
            .filter(move |token| !group && !token.eq_ignore_ascii_case("undefined"))
    }

    /// The label from the graphics attributes, if set.
    pub fn graphics_label(&self) -> Option<&str> {
        self.graphics.as_ref().and_then(|graphics| graphics.label.as_deref())
    }

    /// Return true if the entry is drawn in the generic background
    /// color, i.e. is not specific to the species of interest.
    pub fn is_generic(&self) -> bool {
        self.graphics
            .as_ref()
            .and_then(|graphics| graphics.bgcolor.as_deref())
            .is_some_and(|color| color.eq_ignore_ascii_case(GENERIC_BGCOLOR))
    }

    /// Return true if the entry refers to another pathway map.
    pub fn references_pathway(&self) -> bool {
        self.entry_type == EntryType::Map || self.name.starts_with("path:")
    }
}

/// A directed, subtype-tagged edge between two entries.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Relation {
    pub entry1: EntryId,
    pub entry2: EntryId,
    /// Subtype tags, see [subtype].
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub subtypes: Vec<String>,
    /// External-database cross-references.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub xrefs: Vec<String>,
    /// Provenance of the relation, if recorded by the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Relation {
    pub fn new(entry1: EntryId, entry2: EntryId) -> Relation {
        Relation {
            entry1,
            entry2,
            subtypes: Vec::new(),
            xrefs: Vec::new(),
            source: None,
        }
    }

    pub fn has_subtype(&self, name: &str) -> bool {
        self.subtypes.iter().any(|subtype| subtype == name)
    }
}

/// A substrate or product slot of a [Reaction].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ReactionComponent {
    pub name: String,
    /// The entry materializing this component, when resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryId>,
    /// Stoichiometric coefficient; missing in the raw markup and
    /// repaired from the reaction equation by the preprocessor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoichiometry: Option<u32>,
}

impl ReactionComponent {
    pub fn new(name: &str) -> ReactionComponent {
        ReactionComponent {
            name: name.to_owned(),
            entry: None,
            stoichiometry: None,
        }
    }

    /// Return true if this component denotes the given bare compound
    /// identifier, with or without a database prefix.
    pub fn matches_compound(&self, compound: &str) -> bool {
        self.name == compound || self.name.rsplit(':').next() == Some(compound)
    }
}

/// A hyperedge describing one biochemical conversion.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Reaction {
    pub name: String,
    #[serde(default)]
    pub reversible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub substrates: Vec<ReactionComponent>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub products: Vec<ReactionComponent>,
}

impl Reaction {
    pub fn new(name: &str, reversible: bool) -> Reaction {
        Reaction {
            name: name.to_owned(),
            reversible,
            substrates: Vec::new(),
            products: Vec::new(),
        }
    }
}

/// A full parsed pathway: entries, relations and reactions.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Pathway {
    _name: String,
    _org: String,
    _title: String,
    _entries: Vec<Entry>,
    _relations: Vec<Relation>,
    _reactions: Vec<Reaction>,
}

impl Pathway {
    pub fn new(name: &str, org: &str, title: &str) -> Pathway {
        Pathway {
            _name: name.to_owned(),
            _org: org.to_owned(),
            _title: title.to_owned(),
            _entries: Vec::new(),
            _relations: Vec::new(),
            _reactions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self._name
    }

    /// The species/organism code of the pathway.
    pub fn org(&self) -> &str {
        &self._org
    }

    pub fn title(&self) -> &str {
        &self._title
    }

    pub fn entries(&self) -> &[Entry] {
        &self._entries
    }

    pub fn relations(&self) -> &[Relation] {
        &self._relations
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self._reactions
    }

    pub(crate) fn reactions_mut(&mut self) -> &mut [Reaction] {
        &mut self._reactions
    }

    pub fn add_entry(&mut self, entry: Entry) {
        self._entries.push(entry);
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self._relations.push(relation);
    }

    pub fn add_reaction(&mut self, reaction: Reaction) {
        self._reactions.push(reaction);
    }

    /// Return the entry with the given pathway-local id.
    pub fn entry_for_id(&self, id: EntryId) -> Option<&Entry> {
        self._entries.iter().find(|entry| entry.id == id)
    }

    /// Return the first entry whose name contains the given
    /// identifier token.
    pub fn entry_for_name(&self, name: &str) -> Option<&Entry> {
        self._entries
            .iter()
            .find(|entry| entry.name.split_whitespace().any(|token| token == name))
    }

    /// Resolve the entry materializing a reaction component, by id if
    /// the component carries one, by name otherwise.
    pub fn entry_for_component(&self, component: &ReactionComponent) -> Option<&Entry> {
        if let Some(id) = component.entry {
            if let Some(entry) = self.entry_for_id(id) {
                return Some(entry);
            }
        }
        self.entry_for_name(&component.name)
    }

    pub fn has_reaction_named(&self, name: &str) -> bool {
        self._reactions.iter().any(|reaction| reaction.name == name)
    }

    /// The next unused pathway-local entry id.
    pub fn next_entry_id(&self) -> EntryId {
        self._entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1
    }

    /// Keep only entries matching the predicate. Group component
    /// lists and parent references to removed entries are pruned;
    /// relations and reactions keep their (now dangling) references
    /// and are skipped later by the output variants.
    pub(crate) fn retain_entries(&mut self, mut keep: impl FnMut(&Entry) -> bool) {
        self._entries.retain(|entry| keep(entry));

        let kept: HashSet<EntryId> = self._entries.iter().map(|entry| entry.id).collect();
        for entry in &mut self._entries {
            entry.components.retain(|id| kept.contains(id));
            if entry.parent_group.is_some_and(|id| !kept.contains(&id)) {
                entry.parent_group = None;
            }
        }
    }
}
