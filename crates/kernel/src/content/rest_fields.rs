//! REST field registry.
//!
//! Extra fields attached to a post type's REST representation. Each field has
//! optional read and write accessors supplied by the registering plugin.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use wordepress_sdk::RestFields;
use wordepress_sdk::types::RestFieldDefinition;

/// Registry of REST fields, in registration order.
#[derive(Clone, Default)]
pub struct RestFieldRegistry {
    fields: Arc<RwLock<Vec<RestFieldDefinition>>>,
}

impl RestFieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields registered for a post type, in registration order.
    pub fn fields_for(&self, post_type: &str) -> Vec<RestFieldDefinition> {
        self.fields
            .read()
            .iter()
            .filter(|f| f.post_type == post_type)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

impl RestFields for RestFieldRegistry {
    /// Registering the same field twice replaces the earlier definition in place.
    fn register_rest_field(&self, field: RestFieldDefinition) {
        debug!(
            post_type = %field.post_type,
            field = %field.field_name,
            "registered REST field"
        );
        let mut fields = self.fields.write();
        match fields
            .iter_mut()
            .find(|f| f.post_type == field.post_type && f.field_name == field.field_name)
        {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_registration_order() {
        let registry = RestFieldRegistry::new();
        for name in ["wpcf-product", "wpcf-version", "wpcf-name"] {
            registry.register_rest_field(RestFieldDefinition::new("documentation", name));
        }
        registry.register_rest_field(RestFieldDefinition::new("tutorials", "wpcf-name"));

        let names: Vec<_> = registry
            .fields_for("documentation")
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(names, vec!["wpcf-product", "wpcf-version", "wpcf-name"]);
        assert_eq!(registry.fields_for("tutorials").len(), 1);
    }

    #[test]
    fn reregistration_replaces() {
        let registry = RestFieldRegistry::new();
        registry.register_rest_field(RestFieldDefinition::new("documentation", "wpcf-tag"));
        registry.register_rest_field(
            RestFieldDefinition::new("documentation", "wpcf-tag")
                .schema(serde_json::json!({"type": "string"})),
        );

        let fields = registry.fields_for("documentation");
        assert_eq!(fields.len(), 1);
        assert!(fields[0].schema.is_some());
    }

    #[test]
    fn fields_for_unknown_type_are_stored_but_unused() {
        let registry = RestFieldRegistry::new();
        registry.register_rest_field(RestFieldDefinition::new("missing", "wpcf-name"));
        assert_eq!(registry.len(), 1);
        assert!(registry.fields_for("documentation").is_empty());
    }
}
