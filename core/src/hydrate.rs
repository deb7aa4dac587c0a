//! Row hydration with identity-chain deduplication.
//!
//! A join against a has-many relationship repeats the parent columns once per
//! child row. The hydrator recognises repeated parents by their identity
//! column, so each logical row is materialised once and its collections grow
//! as further rows arrive.

use compact_str::{CompactString, ToCompactString};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::ConversionError;
use crate::schema::{Collection, Hydrate};
use crate::value::Value;
use crate::walker::{Completion, Plan};

/// Scan destinations for one row, one slot per rendered column.
///
/// The slots are overwritten in place on every row; hydrated values keep their
/// own copies, so nothing read from a previous row is affected.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    slots: Vec<Value>,
}

impl Bindings {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Value::Null; len],
        }
    }

    pub fn for_plan(plan: &Plan) -> Self {
        Self::new(plan.slots())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> &Value {
        &self.slots[slot]
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [Value] {
        &mut self.slots
    }
}

/// Identities from the root result down to the current depth.
#[derive(Debug, Default)]
struct IdentChain {
    idents: SmallVec<[CompactString; 4]>,
}

impl IdentChain {
    fn push(&mut self, ident: CompactString) {
        self.idents.push(ident);
    }

    fn pop(&mut self) {
        self.idents.pop();
    }

    /// The deepest identity first, followed by each ancestor. Every segment is
    /// prefixed with its byte length, so identities containing separators
    /// cannot run into each other.
    fn key(&self) -> CompactString {
        let mut key = CompactString::default();
        for ident in self.idents.iter().rev() {
            key.push_str(&ident.len().to_compact_string());
            key.push(':');
            key.push_str(ident);
        }
        key
    }
}

/// Applies a [`Plan`]'s completion steps to scanned rows.
///
/// The dedup maps live as long as the hydrator, which is meant to cover one
/// query execution.
pub struct RowHydrator<'p> {
    plan: &'p Plan,
    visited: Vec<HashMap<CompactString, usize>>,
    chain: IdentChain,
}

impl<'p> RowHydrator<'p> {
    pub fn new(plan: &'p Plan) -> Self {
        Self {
            plan,
            visited: (0..plan.nodes()).map(|_| HashMap::new()).collect(),
            chain: IdentChain::default(),
        }
    }

    /// Merges one scanned row into `results`.
    ///
    /// Without has-many relationships every row appends a new result. With
    /// them, a row whose root identity was seen before is merged into the
    /// earlier result, and a row with a NULL root identity is skipped.
    pub fn complete(
        &mut self,
        bindings: &Bindings,
        results: &mut dyn Collection,
    ) -> Result<(), ConversionError> {
        let plan = self.plan;
        let root = &plan.root;
        match root.ident {
            Some((slot, node)) => self.dedup(node, slot, results, &root.steps, bindings),
            None => {
                let index = results.push_default();
                let row = element(results, index)?;
                self.apply(&root.steps, row, bindings)
            }
        }
    }

    /// Copies one scanned row into a single value.
    pub fn complete_one(
        &mut self,
        bindings: &Bindings,
        target: &mut dyn Hydrate,
    ) -> Result<(), ConversionError> {
        let plan = self.plan;
        self.apply(&plan.root.steps, target, bindings)
    }

    fn dedup(
        &mut self,
        node: usize,
        slot: usize,
        collection: &mut dyn Collection,
        steps: &'p [Completion],
        bindings: &Bindings,
    ) -> Result<(), ConversionError> {
        let Some(ident) = bindings.get(slot).ident_text() else {
            return Ok(());
        };
        self.chain.push(ident);
        let key = self.chain.key();

        let seen = self.visited[node].get(&key).copied();
        let index = match seen {
            Some(index) => index,
            None => {
                let index = collection.push_default();
                self.visited[node].insert(key, index);
                index
            }
        };
        let result = element(collection, index).and_then(|target| self.apply(steps, target, bindings));

        self.chain.pop();
        result
    }

    fn apply(
        &mut self,
        steps: &'p [Completion],
        target: &mut dyn Hydrate,
        bindings: &Bindings,
    ) -> Result<(), ConversionError> {
        for step in steps {
            match step {
                Completion::Column { field, slot } => target.set(*field, bindings.get(*slot))?,
                Completion::Nested { field, steps } => {
                    let nested = target.nested(*field).ok_or(ConversionError::UnknownField {
                        kind: "nested",
                        field: *field,
                    })?;
                    self.apply(steps, nested, bindings)?;
                }
                Completion::Many {
                    field,
                    ident,
                    node,
                    steps,
                } => {
                    let collection = target.many(*field).ok_or(ConversionError::UnknownField {
                        kind: "has-many",
                        field: *field,
                    })?;
                    self.dedup(*node, *ident, collection, steps, bindings)?;
                }
            }
        }
        Ok(())
    }
}

fn element(collection: &mut dyn Collection, index: usize) -> Result<&mut dyn Hydrate, ConversionError> {
    collection.element(index).ok_or(ConversionError::UnknownField {
        kind: "element",
        field: index,
    })
}
