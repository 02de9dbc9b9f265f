use super::*;
use precheck_core::Value;
use pretty_assertions::assert_eq;
use syn::parse_quote;

fn user_input() -> DeriveInput {
    parse_quote! {
        #[validate(hook = checks::user_hook)]
        struct User {
            #[validate(sanitize(trim, upper))]
            #[validate(required, length(min = 3, max = 50, severity = "warning"))]
            #[validate(custom(function = checks::unique_username, async))]
            username: String,

            #[validate(required, email(message_key = "user.email"), display_name = "E-mail")]
            email: Option<String>,

            #[validate(range(min = 18, max = 120, group = "Creation"))]
            age: i32,

            country: String,

            #[validate(required_if(field = "country", equals = "USA"), rename = "zipCode")]
            zip_code: Option<String>,

            notes: Vec<String>,
        }
    }
}

fn error_text(input: DeriveInput) -> String {
    match scan(&input) {
        Ok(model) => panic!("expected an error, scanned {:?}", model.declaration),
        Err(error) => error.to_string(),
    }
}

#[test]
fn test_scan_builds_canonical_declaration() {
    let model = scan(&user_input()).unwrap();
    let decl = &model.declaration;

    assert_eq!(decl.name, "User");
    assert_eq!(decl.model_hook.as_deref(), Some("checks::user_hook"));

    let names: Vec<_> = decl.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["username", "email", "age", "country", "zipCode"]);

    let username = &decl.fields[0];
    assert_eq!(username.field_type, FieldType::String);
    assert_eq!(username.sanitize, Some(SanitizeDirective::new().trim().upper()));
    assert_eq!(username.constraints.len(), 2);
    assert_eq!(username.constraints[1].severity, Severity::Warning);
    assert_eq!(
        username.custom_validators,
        vec![CustomValidatorRef::asynchronous("checks::unique_username")]
    );

    let email = &decl.fields[1];
    assert!(email.nullable);
    assert_eq!(email.label(), "E-mail");
    assert_eq!(
        email.constraints[1].message,
        Some(MessageSource::Resource("user.email".to_string()))
    );

    assert_eq!(decl.fields[2].field_type, FieldType::Int);
    assert_eq!(decl.fields[2].constraints[0].group.as_deref(), Some("Creation"));
    assert_eq!(
        decl.fields[4].constraints[0].kind,
        ConstraintKind::RequiredIf {
            other: "country".to_string(),
            target: Value::from("USA"),
        }
    );

    assert_eq!(model.fields.len(), decl.fields.len());
    assert_eq!(model.fields[4].ident, "zip_code");
    assert_eq!(model.fields[0].custom_paths.len(), 1);
}

#[test]
fn test_unreferenced_plain_fields_are_skipped() {
    let model = scan(&user_input()).unwrap();
    assert!(model.declaration.field("notes").is_none());
    assert!(model.declaration.field("country").unwrap().constraints.is_empty());
}

#[test]
fn test_positional_lists() {
    let input: DeriveInput = parse_quote! {
        struct Upload {
            #[validate(file_extension("png", ".JPG"), allowed_values(values = "a,b"))]
            file: String,
            #[validate(allowed_values(1, 2, 3))]
            level: u8,
        }
    };
    let model = scan(&input).unwrap();
    assert_eq!(
        model.declaration.fields[0].constraints[0].kind,
        ConstraintKind::FileExtension {
            extensions: vec!["png".to_string(), ".JPG".to_string()],
        }
    );
    assert_eq!(
        model.declaration.fields[1].constraints[0].kind,
        ConstraintKind::AllowedValues {
            values: vec!["1".to_string(), "2".to_string(), "3".to_string()],
        }
    );
}

#[test]
fn test_dangling_reference_is_a_diagnostic() {
    let text = error_text(parse_quote! {
        struct Address {
            #[validate(required_if(field = "nation", equals = "USA"))]
            zip: Option<String>,
        }
    });
    assert!(text.contains("unknown field 'nation'"), "{}", text);
}

#[test]
fn test_invalid_bounds_are_a_diagnostic() {
    let text = error_text(parse_quote! {
        struct Person {
            #[validate(range(min = 120, max = 18))]
            age: u32,
        }
    });
    assert!(text.contains("invalid range bounds"), "{}", text);
}

#[test]
fn test_unknown_items_are_diagnostics() {
    let text = error_text(parse_quote! {
        struct Person {
            #[validate(requird)]
            name: String,
        }
    });
    assert!(text.contains("unknown validate attribute `requird`"), "{}", text);

    let text = error_text(parse_quote! {
        struct Person {
            #[validate(length(min = 1, max = 5, colour = "red"))]
            name: String,
        }
    });
    assert!(text.contains("unknown argument `colour`"), "{}", text);
}

#[test]
fn test_sanitize_rules() {
    let text = error_text(parse_quote! {
        struct Person {
            #[validate(sanitize(trim))]
            age: i64,
        }
    });
    assert!(text.contains("`sanitize` cannot be applied"), "{}", text);

    let text = error_text(parse_quote! {
        struct Person {
            #[validate(sanitize(trim))]
            #[validate(sanitize(upper))]
            name: String,
        }
    });
    assert!(text.contains("at most one `sanitize(...)`"), "{}", text);

    let text = error_text(parse_quote! {
        struct Person {
            #[validate(sanitize(trim, shout))]
            name: String,
        }
    });
    assert!(text.contains("unknown sanitize option `shout`"), "{}", text);

    let text = error_text(parse_quote! {
        struct Person {
            #[validate(sanitize)]
            name: String,
        }
    });
    assert!(text.contains("`sanitize` expects options"), "{}", text);
}

#[test]
fn test_sanitize_inside_validate() {
    let model = scan(&parse_quote! {
        struct Person {
            #[validate(required, sanitize(lower, trim), length(max = 20))]
            name: Option<String>,
        }
    })
    .unwrap();

    let name = &model.declaration.fields[0];
    assert_eq!(name.sanitize, Some(SanitizeDirective::new().trim().lower()));
    let kinds: Vec<_> = name.constraints.iter().map(|c| c.kind.name()).collect();
    assert_eq!(kinds, vec!["required", "string_length"]);
    assert_eq!(model.fields[0].constraint_spans.len(), 2);
}

#[test]
fn test_only_named_structs() {
    let text = error_text(parse_quote! {
        enum Shape { Circle, Square }
    });
    assert!(text.contains("structs"), "{}", text);

    let text = error_text(parse_quote! {
        struct Pair(String, String);
    });
    assert!(text.contains("named fields"), "{}", text);
}

#[test]
fn test_infer_field_type() {
    let cases: Vec<(Type, FieldType, bool)> = vec![
        (parse_quote!(String), FieldType::String, false),
        (parse_quote!(Option<String>), FieldType::String, true),
        (parse_quote!(&'a str), FieldType::String, false),
        (parse_quote!(u64), FieldType::Int, false),
        (parse_quote!(i128), FieldType::Int, false),
        (parse_quote!(Option<f32>), FieldType::Float, true),
        (parse_quote!(chrono::DateTime<chrono::Utc>), FieldType::Date, false),
        (parse_quote!(Box<bool>), FieldType::Bool, false),
        (parse_quote!(Vec<String>), FieldType::Other, false),
    ];
    for (ty, expected, nullable) in cases {
        assert_eq!(infer_field_type(&ty), (expected, nullable));
    }
}
