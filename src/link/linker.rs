//! Reference linker

use super::types::{FieldPath, LinkOutcome, LinkRule, LinkSet, MissingPolicy, SiblingCache};
use crate::naming::ResourceNamer;
use crate::value::{AttrValue, AttributeMap, RawAccess};
use tracing::debug;

/// Result of linking a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Done,
    /// A `DropEntry` key did not resolve
    Missing,
    /// A `DropElementOrSkip` list went from non-empty to empty
    Emptied,
}

/// Rewrites foreign keys into references to sibling resources
#[derive(Debug)]
pub struct ReferenceLinker<'a> {
    cache: &'a SiblingCache,
    links: &'a LinkSet,
    namer: ResourceNamer,
}

impl<'a> ReferenceLinker<'a> {
    pub fn new(cache: &'a SiblingCache, links: &'a LinkSet, namer: ResourceNamer) -> Self {
        Self {
            cache,
            links,
            namer,
        }
    }

    /// Apply `rules` to `map` in order
    pub fn link(&self, map: &mut AttributeMap, rules: &[LinkRule]) -> LinkOutcome {
        let mut outcome = LinkOutcome::Keep;

        for rule in rules {
            match rule {
                LinkRule::Reference {
                    field,
                    target,
                    attribute,
                    missing,
                    unless_flag,
                } => {
                    if !self.links.allows(target) {
                        continue;
                    }
                    let resolution = match field {
                        FieldPath::Top(name) => {
                            let resolution = map
                                .get_mut(name)
                                .map(|value| self.link_value(value, target, attribute, *missing))
                                .unwrap_or(Resolution::Done);
                            if resolution == Resolution::Missing {
                                map.remove(name);
                            }
                            resolution
                        }
                        FieldPath::Nested { parent, field } => self.link_nested(
                            map,
                            parent,
                            field,
                            target,
                            attribute,
                            *missing,
                            unless_flag.as_deref(),
                        ),
                    };
                    if resolution == Resolution::Emptied {
                        outcome = LinkOutcome::Skip;
                    }
                }
                LinkRule::Placeholder {
                    field,
                    text,
                    gated_by,
                } => {
                    if gated_by.iter().any(|t| self.links.allows(t)) {
                        map.insert(field.clone(), AttrValue::string(text.clone()));
                    }
                }
                LinkRule::DependsOn {
                    target,
                    project_id,
                    names,
                } => {
                    if self.links.allows(target) {
                        self.add_depends_on(map, target, *project_id, names);
                    }
                }
            }
        }

        outcome
    }

    fn resolve(&self, value: &AttrValue, target: &str, attribute: &str) -> Option<AttrValue> {
        if value.is_reference() {
            return Some(value.clone());
        }
        let key = value.id_key()?;
        self.cache
            .contains(target, &key)
            .then(|| AttrValue::reference(self.namer.reference(target, &key, attribute)))
    }

    fn link_value(
        &self,
        value: &mut AttrValue,
        target: &str,
        attribute: &str,
        missing: MissingPolicy,
    ) -> Resolution {
        match value {
            AttrValue::Null | AttrValue::Map(_) | AttrValue::Reference(_) => Resolution::Done,
            AttrValue::Scalar(_) => match self.resolve(value, target, attribute) {
                Some(reference) => {
                    *value = reference;
                    Resolution::Done
                }
                None => {
                    debug!("{} {:?} not found, applying {:?}", target, value, missing);
                    match missing {
                        MissingPolicy::KeepLiteral | MissingPolicy::KeepElement => Resolution::Done,
                        MissingPolicy::DropElement | MissingPolicy::DropElementOrSkip => {
                            *value = AttrValue::Null;
                            Resolution::Done
                        }
                        MissingPolicy::DropEntry => Resolution::Missing,
                    }
                }
            },
            AttrValue::List(items) => {
                let resolved: Vec<Option<AttrValue>> = items
                    .iter()
                    .map(|item| self.resolve(item, target, attribute))
                    .collect();
                let complete = resolved.iter().all(Option::is_some);

                match missing {
                    MissingPolicy::KeepLiteral => {
                        if complete {
                            *items = resolved.into_iter().flatten().collect();
                        }
                        Resolution::Done
                    }
                    MissingPolicy::KeepElement => {
                        for (item, reference) in items.iter_mut().zip(resolved) {
                            if let Some(reference) = reference {
                                *item = reference;
                            }
                        }
                        Resolution::Done
                    }
                    MissingPolicy::DropEntry => {
                        if complete {
                            *items = resolved.into_iter().flatten().collect();
                            Resolution::Done
                        } else {
                            Resolution::Missing
                        }
                    }
                    MissingPolicy::DropElement | MissingPolicy::DropElementOrSkip => {
                        let was_empty = items.is_empty();
                        *items = resolved.into_iter().flatten().collect();
                        if missing == MissingPolicy::DropElementOrSkip
                            && !was_empty
                            && items.is_empty()
                        {
                            Resolution::Emptied
                        } else {
                            Resolution::Done
                        }
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn link_nested(
        &self,
        map: &mut AttributeMap,
        parent: &str,
        field: &str,
        target: &str,
        attribute: &str,
        missing: MissingPolicy,
        unless_flag: Option<&str>,
    ) -> Resolution {
        let mut emptied = false;
        let mut link_entry = |entry: &mut AttributeMap| -> Resolution {
            if unless_flag.is_some_and(|flag| entry.get(flag) == Some(&AttrValue::bool(true))) {
                return Resolution::Done;
            }
            let resolution = entry
                .get_mut(field)
                .map(|value| self.link_value(value, target, attribute, missing))
                .unwrap_or(Resolution::Done);
            if resolution == Resolution::Emptied {
                emptied = true;
            }
            resolution
        };

        let drop_parent = match map.get_mut(parent) {
            Some(AttrValue::Map(entry)) => link_entry(entry) == Resolution::Missing,
            Some(AttrValue::List(items)) => {
                items.retain_mut(|item| match item {
                    AttrValue::Map(entry) => link_entry(entry) != Resolution::Missing,
                    _ => true,
                });
                false
            }
            _ => false,
        };
        if drop_parent {
            map.remove(parent);
        }

        if emptied {
            Resolution::Emptied
        } else {
            Resolution::Done
        }
    }

    fn add_depends_on(&self, map: &mut AttributeMap, target: &str, project_id: i64, names: &[String]) {
        let references: Vec<AttrValue> = self
            .cache
            .records(target)
            .filter(|(_, raw)| {
                raw.opt_i64("project_id").ok().flatten() == Some(project_id)
                    && raw
                        .opt_str("name")
                        .ok()
                        .flatten()
                        .is_some_and(|name| names.iter().any(|n| n == name))
            })
            .map(|(id, _)| AttrValue::reference(self.namer.address(target, id)))
            .collect();

        if references.is_empty() {
            return;
        }
        match map.get_mut("depends_on") {
            Some(AttrValue::List(existing)) => existing.extend(references),
            _ => {
                map.insert("depends_on".to_string(), AttrValue::List(references));
            }
        }
    }
}
