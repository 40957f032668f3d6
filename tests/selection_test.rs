//! Tests for typed selection requests and their validation

use uuid::Uuid;

use orgtree::application::{FieldSelection, LinkedSelection, SelectionRequest};
use orgtree::domain::{AllowedValue, Catalog, CustomField, DomainError, Position};

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        CustomField::new(id(1), "department", "Department")
            .with_value(AllowedValue::new(id(11), "Eng")),
        CustomField::new(id(3), "seniority", "Seniority")
            .with_value(AllowedValue::new(id(31), "Senior").linking(id(4), &[id(41)]))
            .with_value(AllowedValue::new(id(32), "Junior")),
        CustomField::new(id(4), "specialization", "Specialization")
            .with_value(AllowedValue::new(id(41), "Backend"))
            .with_value(AllowedValue::new(id(42), "Frontend")),
    ])
}

fn value(field: u128, value: u128) -> FieldSelection {
    FieldSelection::Value {
        field_id: id(field),
        value_id: id(value),
        linked: Vec::new(),
    }
}

fn senior_with(linked_field: u128, linked_values: &[u128]) -> FieldSelection {
    FieldSelection::Value {
        field_id: id(3),
        value_id: id(31),
        linked: vec![LinkedSelection {
            field_id: id(linked_field),
            value_ids: linked_values.iter().map(|v| id(*v)).collect(),
        }],
    }
}

fn request(entries: Vec<FieldSelection>) -> SelectionRequest {
    SelectionRequest {
        custom_fields: entries,
    }
}

#[test]
fn given_valid_request_when_validating_then_returns_flat_id_sets() {
    // Arrange
    let request = request(vec![value(1, 11), senior_with(4, &[41])]);

    // Act
    let selection = request.validate(&catalog()).unwrap();

    // Assert
    assert_eq!(selection.field_ids, vec![id(1), id(3)]);
    assert_eq!(selection.value_ids, vec![id(11), id(31), id(41)]);
}

#[test]
fn given_cleared_entry_when_validating_then_field_is_left_out() {
    // Arrange
    let request = request(vec![
        value(1, 11),
        FieldSelection::Cleared { field_id: id(3) },
    ]);

    // Act
    let selection = request.validate(&catalog()).unwrap();

    // Assert
    assert_eq!(selection.field_ids, vec![id(1)]);
    assert_eq!(selection.value_ids, vec![id(11)]);
}

#[test]
fn given_unknown_field_when_validating_then_rejects() {
    // Arrange
    let request = request(vec![value(99, 11)]);

    // Act
    let result = request.validate(&catalog());

    // Assert
    assert_eq!(result, Err(DomainError::UnknownField(id(99))));
}

#[test]
fn given_value_of_other_field_when_validating_then_rejects() {
    // Arrange
    let request = request(vec![value(1, 31)]);

    // Act
    let result = request.validate(&catalog());

    // Assert
    assert_eq!(
        result,
        Err(DomainError::ValueNotInField {
            field_id: id(1),
            value_id: id(31)
        })
    );
}

#[test]
fn given_field_selected_twice_when_validating_then_rejects() {
    // Arrange
    let request = request(vec![value(3, 31), value(3, 32)]);

    // Act
    let result = request.validate(&catalog());

    // Assert
    assert_eq!(result, Err(DomainError::DuplicateField(id(3))));
}

#[test]
fn given_link_not_declared_on_value_when_validating_then_rejects() {
    // Arrange
    let request = request(vec![senior_with(1, &[11])]);

    // Act
    let result = request.validate(&catalog());

    // Assert
    assert_eq!(
        result,
        Err(DomainError::LinkNotDeclared {
            value_id: id(31),
            linked_field_id: id(1)
        })
    );
}

#[test]
fn given_linked_value_outside_declared_subset_when_validating_then_rejects() {
    // Arrange
    let request = request(vec![senior_with(4, &[42])]);

    // Act
    let result = request.validate(&catalog());

    // Assert
    assert_eq!(
        result,
        Err(DomainError::LinkedValueNotAllowed {
            linked_field_id: id(4),
            value_id: id(42)
        })
    );
}

#[test]
fn given_json_request_when_decoding_then_reads_tagged_entries() {
    // Arrange
    let json = format!(
        r#"{{ "custom_fields": [
            {{ "kind": "value", "field_id": "{}", "value_id": "{}",
               "linked": [ {{ "field_id": "{}", "value_ids": ["{}"] }} ] }},
            {{ "kind": "cleared", "field_id": "{}" }}
        ] }}"#,
        id(3),
        id(31),
        id(4),
        id(41),
        id(1)
    );

    // Act
    let request: SelectionRequest = serde_json::from_str(&json).unwrap();

    // Assert
    assert_eq!(request.custom_fields.len(), 2);
    assert_eq!(request.custom_fields[0], senior_with(4, &[41]));
    assert_eq!(request.custom_fields[1].field_id(), id(1));
}

#[test]
fn given_untyped_entry_when_decoding_then_fails() {
    // Arrange
    let json = r#"{ "custom_fields": [ { "field_id": "not-a-uuid" } ] }"#;

    // Act
    let result = serde_json::from_str::<SelectionRequest>(json);

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_validated_selection_when_applying_then_position_selection_is_replaced() {
    // Arrange
    let position = Position::new(1, "Lead").select(id(3), id(32));
    let selection = request(vec![value(1, 11)]).validate(&catalog()).unwrap();

    // Act
    let updated = selection.apply(position);

    // Assert
    assert_eq!(updated.id, 1);
    assert_eq!(updated.field_ids, vec![id(1)]);
    assert_eq!(updated.value_ids, vec![id(11)]);
}
