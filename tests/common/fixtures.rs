//! Entity builders for integration tests.
#![allow(dead_code)]

use doc_directives::domain::entity::{Field, Function, Inspection, Receiver, Type};

pub const CHARIOT_JSON: &str = "tests/fixtures/chariot.json";
pub const MALFORMED_JSON: &str = "tests/fixtures/malformed.json";

/// Lines taken from real handler and model comments.
pub const GOOD_LINES: &[&str] = &[
    "chariot.route{path=/{name}}",
    "crud.model{name=users,pk=id}",
    "crud.field{name=email,unique}",
    "gen.doc {title=\"Hello, world\",draft}",
];

/// Lines that must each produce exactly one warning when every line is scanned.
pub const BAD_LINES: &[&str] = &[
    "chariot.route{path=/{name}",
    "crud.field{name=id, pk}",
    "my-id{k=v}",
    "a.b  {k=v}",
];

pub fn comments(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

pub fn function(package: &str, name: &str, lines: &[&str]) -> Function {
    Function {
        name: name.to_string(),
        package: package.to_string(),
        file_path: format!("{package}/{}.go", name.to_lowercase()),
        comments: comments(lines),
        ..Default::default()
    }
}

pub fn method(package: &str, receiver: &str, name: &str, lines: &[&str]) -> Function {
    Function {
        receiver: Some(Receiver {
            receiver_type: receiver.to_string(),
            is_pointer: true,
        }),
        ..function(package, name, lines)
    }
}

pub fn field(name: &str, type_name: &str, lines: &[&str]) -> Field {
    Field {
        name: name.to_string(),
        type_name: type_name.to_string(),
        comments: comments(lines),
        ..Default::default()
    }
}

pub fn ty(package: &str, name: &str, lines: &[&str], fields: Vec<Field>) -> Type {
    Type {
        name: name.to_string(),
        package: package.to_string(),
        file_path: format!("{package}/{}.go", name.to_lowercase()),
        fields,
        comments: comments(lines),
    }
}

/// A `User` model plus two routed handlers, all well-formed.
pub fn clean_inspection() -> Inspection {
    Inspection {
        types: vec![ty(
            "complex",
            "User",
            &["User is a registered account.", "crud.model{name=users}"],
            vec![
                field("ID", "*string", &["crud.field{name=id,pk}"]),
                field("Email", "string", &["crud.field{name=email,unique}"]),
                field("Note", "string", &[]),
            ],
        )],
        functions: vec![
            function(
                "home",
                "Home",
                &[
                    "Home is the default route, triggered when root is called",
                    "chariot.route{path=/{name}}",
                ],
            ),
            function("home", "Another", &["chariot.route{path=/special/{param}/name}"]),
            method("store", "Repo", "Save", &["Save persists the model."]),
        ],
    }
}
