//! Tests for FieldResolver and the catalog lookups it relies on

use uuid::Uuid;

use orgtree::domain::{
    AllowedValue, Catalog, CustomField, Diagnostic, FieldResolver, Position,
};

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        CustomField::new(id(1), "department", "Department")
            .with_value(AllowedValue::new(id(11), "Eng"))
            .with_value(AllowedValue::new(id(12), "Ops"))
            .with_value(AllowedValue::new(id(13), "")),
        CustomField::new(id(3), "seniority", "Seniority").with_value(
            AllowedValue::new(id(31), "Senior")
                .linking(id(4), &[id(41), id(42)])
                .linking(id(5), &[id(51)]),
        ),
        CustomField::new(id(4), "specialization", "Specialization")
            .with_value(AllowedValue::new(id(41), "Backend"))
            .with_value(AllowedValue::new(id(42), "Frontend")),
        CustomField::new(id(5), "office", "Office")
            .with_value(AllowedValue::new(id(51), "Berlin")),
    ])
}

#[test]
fn given_selected_value_when_resolving_then_returns_field_with_text() {
    // Arrange
    let catalog = catalog();
    let resolver = FieldResolver::new(&catalog);

    // Act
    let resolution = resolver.resolve(&[id(1)], &[id(11)]);

    // Assert
    assert!(resolution.diagnostics.is_empty());
    assert_eq!(resolution.fields.len(), 1);
    let field = &resolution.fields[0];
    assert_eq!(field.key, "department");
    assert_eq!(field.label, "Department");
    assert_eq!(field.value_id, id(11));
    assert_eq!(field.value, "Eng");
    assert!(field.linked.is_empty());
}

#[test]
fn given_unknown_field_id_when_resolving_then_skips_it_with_diagnostic() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(99), id(1)], &[id(11)]);

    // Assert
    assert_eq!(resolution.fields.len(), 1);
    assert_eq!(
        resolution.diagnostics,
        vec![Diagnostic::UnknownField { field_id: id(99) }]
    );
}

#[test]
fn given_unknown_value_id_when_resolving_then_reports_it() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(1)], &[id(11), id(77)]);

    // Assert
    assert_eq!(resolution.fields.len(), 1);
    assert_eq!(
        resolution.diagnostics,
        vec![Diagnostic::UnknownValue { value_id: id(77) }]
    );
}

#[test]
fn given_field_without_selected_value_when_resolving_then_field_is_omitted() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(1)], &[]);

    // Assert
    assert!(resolution.fields.is_empty());
    assert_eq!(
        resolution.diagnostics,
        vec![Diagnostic::MissingValue { field_id: id(1) }]
    );
}

#[test]
fn given_two_values_for_one_field_when_resolving_then_keeps_first_and_reports() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(1)], &[id(12), id(11)]);

    // Assert
    assert_eq!(resolution.fields[0].value, "Ops");
    assert_eq!(
        resolution.diagnostics,
        vec![Diagnostic::AmbiguousValue {
            field_id: id(1),
            kept: id(12),
            dropped: vec![id(11)],
        }]
    );
}

#[test]
fn given_repeated_field_id_when_resolving_then_field_appears_once() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(1), id(1)], &[id(11)]);

    // Assert
    assert_eq!(resolution.fields.len(), 1);
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn given_linked_selection_when_resolving_then_keeps_only_selected_linked_values() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(3)], &[id(31), id(42)]);

    // Assert
    let field = &resolution.fields[0];
    assert_eq!(field.value, "Senior");
    assert_eq!(field.linked.len(), 1, "office has no selected value");
    assert_eq!(field.linked[0].key, "specialization");
    let texts: Vec<&str> = field.linked[0].values.iter().map(|v| v.text.as_str()).collect();
    assert_eq!(texts, vec!["Frontend"]);
}

#[test]
fn given_linked_value_without_top_level_field_when_resolving_then_no_missing_value_reported() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(3)], &[id(31), id(41), id(51)]);

    // Assert
    assert!(resolution.diagnostics.is_empty());
    assert_eq!(resolution.fields.len(), 1);
    assert_eq!(resolution.fields[0].linked.len(), 2);
}

#[test]
fn given_position_when_resolving_then_map_is_keyed_by_field_key() {
    // Arrange
    let catalog = catalog();
    let mut position = Position::new(7, "Lead").select(id(1), id(11));
    position.employee_full_name = Some("Ada Lovelace".to_string());

    // Act
    let (resolved, diagnostics) = FieldResolver::new(&catalog).resolve_position(&position);

    // Assert
    assert!(diagnostics.is_empty());
    assert_eq!(resolved.id, 7);
    assert_eq!(resolved.employee_full_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(resolved.value_of("department"), Some("Eng"));
    assert_eq!(resolved.value_of("seniority"), None);
}

#[test]
fn given_empty_value_text_when_resolving_then_value_counts_as_unset() {
    // Arrange
    let catalog = catalog();
    let position = Position::new(1, "Blank").select(id(1), id(13));

    // Act
    let (resolved, _) = FieldResolver::new(&catalog).resolve_position(&position);

    // Assert
    assert!(resolved.field("department").is_some());
    assert_eq!(resolved.value_of("department"), None);
}

#[test]
fn given_link_to_unknown_field_when_indexing_then_catalog_reports_dangling_link() {
    // Arrange
    let fields = vec![CustomField::new(id(1), "a", "A")
        .with_value(AllowedValue::new(id(10), "x").linking(id(404), &[id(1)]))];

    // Act
    let catalog = Catalog::new(fields);

    // Assert
    assert!(!catalog.has_links(id(10)));
    assert!(catalog.linked_fields(id(10)).is_empty());
    assert_eq!(
        catalog.diagnostics(),
        &[Diagnostic::DanglingLink {
            value_id: id(10),
            target_id: id(404)
        }]
    );
}

#[test]
fn given_catalog_when_looking_up_then_finds_fields_by_id_and_key() {
    // Arrange
    let catalog = catalog();

    // Act & Assert
    assert_eq!(catalog.fields().len(), 4);
    assert_eq!(catalog.field(id(4)).map(|f| f.key.as_str()), Some("specialization"));
    assert_eq!(catalog.field_by_key("office").map(|f| f.id), Some(id(5)));
    assert_eq!(catalog.owner_of(id(42)).map(|f| f.id), Some(id(4)));
    assert!(catalog.has_links(id(31)));
    assert!(catalog.field_by_key("missing").is_none());
}

#[test]
fn given_repeated_value_id_when_resolving_then_no_ambiguity_is_reported() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(3)], &[id(31), id(31)]);

    // Assert
    assert_eq!(resolution.fields.len(), 1);
    assert_eq!(resolution.fields[0].value, "Senior");
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn given_repeated_unknown_value_id_when_resolving_then_reported_once() {
    // Arrange
    let catalog = catalog();

    // Act
    let resolution = FieldResolver::new(&catalog).resolve(&[id(1)], &[id(11), id(77), id(77)]);

    // Assert
    assert_eq!(
        resolution.diagnostics,
        vec![Diagnostic::UnknownValue { value_id: id(77) }]
    );
}
