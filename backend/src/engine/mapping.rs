//! Field mapping between template placeholders and dataset fields.

use common::model::mapping::FieldMapping;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Proposes a binding for every placeholder whose name equals a data field
/// name, ignoring case. Placeholders without a match are left out.
pub fn auto_map(placeholders: &[String], data_fields: &[String]) -> Vec<FieldMapping> {
    let mut seen = HashSet::new();
    placeholders
        .iter()
        .filter(|placeholder| seen.insert(placeholder.as_str()))
        .filter_map(|placeholder| {
            let wanted = placeholder.to_lowercase();
            data_fields
                .iter()
                .find(|field| field.to_lowercase() == wanted)
                .map(|field| FieldMapping::new(placeholder.as_str(), field.as_str()))
        })
        .collect()
}

/// Binds `placeholder` to `data_field`, replacing any previous binding of the
/// same placeholder.
pub fn set_mapping(
    current: &[FieldMapping],
    placeholder: &str,
    data_field: &str,
) -> Vec<FieldMapping> {
    current
        .iter()
        .filter(|m| m.placeholder != placeholder)
        .cloned()
        .chain(std::iter::once(FieldMapping::new(placeholder, data_field)))
        .collect()
}

/// Placeholders with no binding, in placeholder order.
pub fn unmapped(placeholders: &[String], mappings: &[FieldMapping]) -> Vec<String> {
    let bound: HashSet<&str> = mappings.iter().map(|m| m.placeholder.as_str()).collect();
    let mut seen = HashSet::new();
    placeholders
        .iter()
        .filter(|p| !bound.contains(p.as_str()) && seen.insert(p.as_str()))
        .cloned()
        .collect()
}

/// True when every placeholder has exactly one binding and nothing else is bound.
pub fn is_complete(placeholders: &[String], mappings: &[FieldMapping]) -> bool {
    validate(placeholders, mappings).is_ok()
}

/// What keeps a mapping set from being complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingGaps {
    /// Placeholders without a binding.
    pub unmapped: Vec<String>,
    /// Bindings for names that are not placeholders of the template.
    pub unknown: Vec<String>,
    /// Placeholders bound more than once.
    pub duplicated: Vec<String>,
}

impl MappingGaps {
    pub fn is_empty(&self) -> bool {
        self.unmapped.is_empty() && self.unknown.is_empty() && self.duplicated.is_empty()
    }
}

impl fmt::Display for MappingGaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.unmapped.is_empty() {
            parts.push(format!("unmapped placeholders: {}", self.unmapped.join(", ")));
        }
        if !self.unknown.is_empty() {
            parts.push(format!("unknown placeholders: {}", self.unknown.join(", ")));
        }
        if !self.duplicated.is_empty() {
            parts.push(format!(
                "placeholders mapped more than once: {}",
                self.duplicated.join(", ")
            ));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Checks that `mappings` binds exactly the placeholder set, once each.
pub fn validate(placeholders: &[String], mappings: &[FieldMapping]) -> Result<(), MappingGaps> {
    let expected: HashSet<&str> = placeholders.iter().map(String::as_str).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for mapping in mappings {
        *counts.entry(mapping.placeholder.as_str()).or_default() += 1;
    }

    let mut gaps = MappingGaps {
        unmapped: unmapped(placeholders, mappings),
        ..MappingGaps::default()
    };
    let mut reported = HashSet::new();
    for mapping in mappings {
        let name = mapping.placeholder.as_str();
        if !reported.insert(name) {
            continue;
        }
        if !expected.contains(name) {
            gaps.unknown.push(name.to_string());
        } else if counts[name] > 1 {
            gaps.duplicated.push(name.to_string());
        }
    }

    if gaps.is_empty() {
        Ok(())
    } else {
        Err(gaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn auto_map_ignores_case() {
        let mappings = auto_map(&names(&["email"]), &names(&["Email"]));
        assert_eq!(mappings, vec![FieldMapping::new("email", "Email")]);
        assert!(is_complete(&names(&["email"]), &mappings));
    }

    #[test]
    fn auto_map_leaves_unmatched_placeholders_out() {
        let placeholders = names(&["Name", "Company"]);
        let mappings = auto_map(&placeholders, &names(&["name", "email"]));
        assert_eq!(mappings, vec![FieldMapping::new("Name", "name")]);
        assert_eq!(unmapped(&placeholders, &mappings), names(&["Company"]));
        assert!(!is_complete(&placeholders, &mappings));
    }

    #[test]
    fn set_mapping_replaces_existing_binding() {
        let start = vec![FieldMapping::new("Name", "name")];
        let once = set_mapping(&start, "Name", "full_name");
        let twice = set_mapping(&once, "Name", "full_name");
        assert_eq!(once, vec![FieldMapping::new("Name", "full_name")]);
        assert_eq!(once, twice);
    }

    #[test]
    fn set_mapping_order_does_not_matter_for_completeness() {
        let placeholders = names(&["A", "B"]);
        let ab = set_mapping(&set_mapping(&[], "A", "x"), "B", "y");
        let ba = set_mapping(&set_mapping(&[], "B", "y"), "A", "x");
        assert!(is_complete(&placeholders, &ab));
        assert!(is_complete(&placeholders, &ba));
    }

    #[test]
    fn validate_names_every_gap() {
        let placeholders = names(&["A", "B", "C"]);
        let mappings = vec![
            FieldMapping::new("A", "a"),
            FieldMapping::new("A", "a2"),
            FieldMapping::new("Z", "z"),
        ];
        let gaps = validate(&placeholders, &mappings).unwrap_err();
        assert_eq!(gaps.unmapped, names(&["B", "C"]));
        assert_eq!(gaps.unknown, names(&["Z"]));
        assert_eq!(gaps.duplicated, names(&["A"]));
        assert_eq!(
            gaps.to_string(),
            "unmapped placeholders: B, C; unknown placeholders: Z; placeholders mapped more than once: A"
        );
    }
}
