use crate::kind::Slot;
use crate::model::{Document, EntityPath, Fields};
use serde_json::Value;

/// Visitor pattern for walking every entity of a document immutably
///
/// The default `visit_slot` walks the slot's entities in position order.
/// Override `visit_entity` to act on each one.
pub trait EntityVisitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_slot(&mut self, doc: &Document, slot: Slot) {
        walk_slot(self, doc, slot);
    }

    fn visit_entity(&mut self, path: &EntityPath, fields: &Fields);
}

/// Mutable visitor pattern for rewriting entities in place
pub trait EntityVisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_document_mut(self, doc);
    }

    fn visit_entity_mut(&mut self, path: &EntityPath, fields: &mut Fields);
}

impl<F> EntityVisitor for F
where
    F: FnMut(&EntityPath, &Fields),
{
    fn visit_entity(&mut self, path: &EntityPath, fields: &Fields) {
        self(path, fields)
    }
}

impl<F> EntityVisitorMut for F
where
    F: FnMut(&EntityPath, &mut Fields),
{
    fn visit_entity_mut(&mut self, path: &EntityPath, fields: &mut Fields) {
        self(path, fields)
    }
}

/// Call `f` for every entity of every slot
pub fn for_each_entity(doc: &Document, mut f: impl FnMut(&EntityPath, &Fields)) {
    f.visit_document(doc);
}

/// Call `f` for every entity of every slot, allowing in-place edits
pub fn for_each_entity_mut(doc: &mut Document, mut f: impl FnMut(&EntityPath, &mut Fields)) {
    f.visit_document_mut(doc);
}

pub fn walk_document<V: EntityVisitor>(visitor: &mut V, doc: &Document) {
    for slot in Slot::ALL {
        visitor.visit_slot(doc, slot);
    }
}

pub fn walk_slot<V: EntityVisitor>(visitor: &mut V, doc: &Document, slot: Slot) {
    for entity in doc.entities(slot) {
        visitor.visit_entity(&entity.path, entity.fields);
    }
}

pub fn walk_document_mut<V: EntityVisitorMut>(visitor: &mut V, doc: &mut Document) {
    for slot in Slot::ALL {
        let Some(value) = doc.get_mut(slot.key()) else {
            continue;
        };

        match value {
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    if let Value::Object(fields) = item {
                        visitor.visit_entity_mut(&EntityPath::indexed(slot, index), fields);
                    }
                }
            }
            Value::Object(fields) => {
                visitor.visit_entity_mut(&EntityPath::single(slot), fields);
            }
            _ => {}
        }
    }
}
