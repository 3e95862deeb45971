//! Propagation of explicit relationships up the ownership tree.

use indexmap::IndexMap;
use log::{debug, warn};

use archmodel_core::identifier::{ElementId, RelationshipId};

use super::{InteractionStyle, Model, Relationship};

impl Model {
    /// Adds implicit relationships between the ancestors of the ends of every
    /// explicit relationship.
    ///
    /// For an explicit relationship `S -> D`, every pair drawn from `S` plus
    /// its ancestors and `D` plus its ancestors gets a relationship, unless the
    /// pair already has one, is the original pair, or is related by ownership.
    /// When several explicit relationships map to the same pair, description
    /// and technology are kept only if all of them agree on one non-empty
    /// value. Each implicit relationship links back to the first explicit
    /// relationship that produced it.
    ///
    /// Running this again adds nothing new.
    ///
    /// # Returns
    ///
    /// The ids of the relationships that were created.
    pub fn add_implicit_relationships(&mut self) -> Vec<RelationshipId> {
        let mut candidates: IndexMap<(ElementId, ElementId), Vec<&Relationship>> = IndexMap::new();
        for relationship in self.relationships().filter(|r| !r.is_linked()) {
            let sources = self.self_and_ancestors(relationship.source_id());
            let destinations = self.self_and_ancestors(relationship.destination_id());
            for source in &sources {
                for destination in &destinations {
                    if relationship.connects(source, destination)
                        || source == destination
                        || self.is_ancestor_of(source, destination)
                        || self.is_ancestor_of(destination, source)
                    {
                        continue;
                    }
                    candidates
                        .entry((source.clone(), destination.clone()))
                        .or_default()
                        .push(relationship);
                }
            }
        }

        let planned: Vec<_> = candidates
            .into_iter()
            .filter(|((source, destination), _)| {
                !self.has_efferent_relationship_with(source, destination)
            })
            .filter_map(|((source, destination), contributors)| {
                let first = contributors.first()?;
                Some(PlannedRelationship {
                    source,
                    destination,
                    description: agreed(contributors.iter().map(|r| r.description())),
                    technology: agreed(contributors.iter().map(|r| r.technology())),
                    interaction_style: agreed_style(&contributors),
                    linked_id: first.id().clone(),
                })
            })
            .collect();

        let mut created = Vec::new();
        for plan in planned {
            match self.create_relationship(
                &plan.source,
                &plan.destination,
                &plan.description,
                &plan.technology,
                plan.interaction_style,
                Some(plan.linked_id),
            ) {
                Ok(Some(id)) => created.push(id),
                Ok(None) => {}
                Err(err) => {
                    warn!(source = plan.source.as_str(), destination = plan.destination.as_str(), err:%; "Skipping implicit relationship");
                }
            }
        }
        debug!(created = created.len(); "Implicit relationships added");
        created
    }

    fn self_and_ancestors(&self, id: &ElementId) -> Vec<ElementId> {
        let mut chain = vec![id.clone()];
        chain.extend(self.ancestors(id));
        chain
    }
}

struct PlannedRelationship {
    source: ElementId,
    destination: ElementId,
    description: String,
    technology: String,
    interaction_style: InteractionStyle,
    linked_id: RelationshipId,
}

/// The single shared non-empty value, or an empty string.
fn agreed<'a>(mut values: impl Iterator<Item = &'a str>) -> String {
    let Some(first) = values.next() else {
        return String::new();
    };
    if values.all(|value| value == first) {
        first.to_string()
    } else {
        String::new()
    }
}

fn agreed_style(contributors: &[&Relationship]) -> InteractionStyle {
    match contributors.split_first() {
        Some((first, rest))
            if rest
                .iter()
                .all(|r| r.interaction_style() == first.interaction_style()) =>
        {
            first.interaction_style()
        }
        _ => InteractionStyle::Synchronous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementType;

    struct Fixture {
        model: Model,
        user: ElementId,
        system: ElementId,
        web_app: ElementId,
    }

    fn fixture() -> Fixture {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        let system = model.add_software_system("Software System", "").unwrap();
        let web_app = model.add_container(&system, "Web Application", "", "").unwrap();
        Fixture {
            model,
            user,
            system,
            web_app,
        }
    }

    #[test]
    fn test_relationship_propagates_to_parent() {
        let mut f = fixture();
        f.model
            .add_relationship(&f.user, &f.web_app, "Uses", Some("HTTPS"), None)
            .unwrap();

        let created = f.model.add_implicit_relationships();
        assert_eq!(created.len(), 1);
        assert_eq!(f.model.element(&f.user).unwrap().relationships().len(), 2);

        let implied = f.model.efferent_relationship_with(&f.user, &f.system).unwrap();
        assert_eq!(implied.description(), "Uses");
        assert_eq!(implied.technology(), "HTTPS");
        assert!(implied.is_linked());
    }

    #[test]
    fn test_disagreeing_descriptions_leave_description_empty() {
        let mut f = fixture();
        f.model.uses(&f.user, &f.web_app, "Uses").unwrap();
        f.model.uses(&f.user, &f.web_app, "Administers").unwrap();

        f.model.add_implicit_relationships();
        assert_eq!(f.model.element(&f.user).unwrap().relationships().len(), 3);
        let implied = f.model.efferent_relationship_with(&f.user, &f.system).unwrap();
        assert_eq!(implied.description(), "");
    }

    #[test]
    fn test_existing_relationship_is_not_duplicated() {
        let mut f = fixture();
        f.model.uses(&f.user, &f.system, "Uses").unwrap();
        f.model.uses(&f.user, &f.web_app, "Uses").unwrap();

        assert!(f.model.add_implicit_relationships().is_empty());
        assert_eq!(f.model.relationships().count(), 2);
    }

    #[test]
    fn test_add_implicit_relationships_is_idempotent() {
        let mut f = fixture();
        let api = f.model.add_container(&f.system, "API", "", "").unwrap();
        let other = f.model.add_software_system("Other", "").unwrap();
        let other_api = f.model.add_container(&other, "Other API", "", "").unwrap();
        f.model.uses(&f.user, &f.web_app, "Uses").unwrap();
        f.model.uses(&api, &other_api, "Calls").unwrap();

        let first = f.model.add_implicit_relationships();
        assert!(!first.is_empty());
        let count = f.model.relationships().count();

        assert!(f.model.add_implicit_relationships().is_empty());
        assert_eq!(f.model.relationships().count(), count);
    }

    #[test]
    fn test_containers_in_different_systems() {
        let mut model = Model::new();
        let s1 = model.add_software_system("S1", "").unwrap();
        let s2 = model.add_software_system("S2", "").unwrap();
        let s3 = model.add_software_system("S3", "").unwrap();
        let c1 = model.add_container(&s1, "C1", "", "").unwrap();
        let c2 = model.add_container(&s2, "C2", "", "").unwrap();
        let c3 = model.add_container(&s3, "C3", "", "").unwrap();
        model
            .add_relationship(&c1, &c2, "Sends data to", Some("JSON"), Some(InteractionStyle::Synchronous))
            .unwrap();
        model
            .add_relationship(&c2, &c3, "Publishes to", Some("AMQP"), Some(InteractionStyle::Asynchronous))
            .unwrap();

        model.add_implicit_relationships();

        let s1_s2 = model.efferent_relationship_with(&s1, &s2).unwrap();
        assert_eq!(s1_s2.description(), "Sends data to");
        assert_eq!(s1_s2.technology(), "JSON");
        assert_eq!(s1_s2.interaction_style(), InteractionStyle::Synchronous);

        let s2_s3 = model.efferent_relationship_with(&s2, &s3).unwrap();
        assert_eq!(s2_s3.interaction_style(), InteractionStyle::Asynchronous);
        assert!(model.has_efferent_relationship_with(&c1, &s2));
        assert!(model.has_efferent_relationship_with(&s1, &c2));
        assert!(!model.has_efferent_relationship_with(&s1, &s3));

        let c_to_s: Vec<_> = model
            .relationships()
            .filter(|r| {
                model.element(r.destination_id()).map(|e| e.element_type())
                    == Some(ElementType::SoftwareSystem)
            })
            .collect();
        assert!(c_to_s.iter().all(|r| r.is_linked()));
    }

    #[test]
    fn test_agreed() {
        assert_eq!(agreed(["a", "a"].into_iter()), "a");
        assert_eq!(agreed(["a", "b"].into_iter()), "");
        assert_eq!(agreed(["", ""].into_iter()), "");
        assert_eq!(agreed(std::iter::empty()), "");
    }
}
