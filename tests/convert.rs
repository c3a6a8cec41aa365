//! End-to-end conversion tests: YAML or JSON snapshots in, a complete
//! TypeSpec document out.

use indoc::indoc;
use pretty_assertions::assert_eq;
use typeslate::convert::convert_project;
use typeslate::oracle::{Project, Snapshot};
use typeslate::report::{Diagnostic, LineIndex};

fn convert_all(project: &Project) -> String {
    let units: Vec<String> = project.units().map(|(name, _)| name.to_owned()).collect();
    let conversion = convert_project(project, &units);
    assert_eq!(conversion.errors.len(), 0);
    conversion.output
}

#[test]
fn test_cross_unit_references() {
    let project = Project::from_yaml(indoc! {"
        types:
          - kind: string
          - kind: object
            symbol: Address
            properties:
              - { name: street, type: 0 }
          - kind: object
            symbol: User
            properties:
              - { name: name, type: 0 }
              - { name: address, type: 1, optional: true }
        units:
          models/address.ts:
            declarations:
              - name: Address
                type: 1
                docs: { tags: [{ name: model }] }
          models/user.ts:
            declarations:
              - name: User
                type: 2
                docs:
                  description: An application user.
                  tags: [{ name: model }]
    "})
    .unwrap();

    assert_eq!(
        convert_all(&project),
        indoc! {r#"
            // models/address.ts
            model Address {
              street: string;
            };

            // models/user.ts
            @doc("An application user.")
            model User {
              name: string;
              address?: Address;
            };"#}
    );
}

#[test]
fn test_recursive_type_references_itself_by_name() {
    let project = Project::from_yaml(indoc! {"
        types:
          - kind: string
          - kind: array
            element: 2
          - kind: object
            symbol: Tree
            properties:
              - { name: label, type: 0 }
              - { name: children, type: 1 }
        units:
          tree.ts:
            declarations:
              - { name: Tree, type: 2, docs: { tags: [{ name: model }] } }
    "})
    .unwrap();

    assert_eq!(
        convert_all(&project),
        indoc! {"
            // tree.ts
            model Tree {
              label: string;
              children: Tree[];
            };"}
    );
}

#[test]
fn test_custom_model_names_apply_everywhere() {
    let project = Project::from_yaml(indoc! {"
        types:
          - kind: string
          - kind: object
            symbol: User
            properties:
              - { name: name, type: 0 }
          - kind: object
            symbol: Team
            properties:
              - { name: owner, type: 1 }
        units:
          api.ts:
            declarations:
              - name: User
                type: 1
                docs: { tags: [{ name: model, text: UserProfile }] }
              - name: Team
                type: 2
                docs: { tags: [{ name: model }] }
    "})
    .unwrap();

    assert_eq!(
        convert_all(&project),
        indoc! {"
            // api.ts
            model UserProfile {
              name: string;
            };

            model Team {
              owner: UserProfile;
            };"}
    );
}

#[test]
fn test_snapshots_merge_into_one_document() {
    let first = Snapshot::from_json(
        r#"{
            "types": [
                { "kind": "string" }
            ],
            "units": {
                "ids.ts": {
                    "declarations": [
                        { "name": "Id", "type": 0, "docs": { "tags": [{ "name": "model" }] } }
                    ]
                }
            }
        }"#,
    )
    .unwrap();
    let second = Snapshot::from_yaml(indoc! {"
        types:
          - kind: number
          - kind: tuple
            elements: [0, 0]
        units:
          pairs.ts:
            declarations:
              - { name: Pair, type: 1, docs: { tags: [{ name: model }] } }
    "})
    .unwrap();

    let project = Project::from_snapshots([first, second]).unwrap();
    assert_eq!(
        convert_all(&project),
        indoc! {"
            // ids.ts
            alias Id = string;

            // pairs.ts
            alias Pair = [float64, float64];"}
    );
}

#[test]
fn test_missing_unit_does_not_abort_the_run() {
    let project = Project::from_yaml(indoc! {"
        types:
          - kind: boolean
        units:
          flags.ts:
            declarations:
              - { name: Flag, type: 0, docs: { tags: [{ name: model }] } }
    "})
    .unwrap();

    let conversion = convert_project(
        &project,
        &["nonesuch.ts".to_owned(), "flags.ts".to_owned()],
    );
    assert_eq!(conversion.output, "// flags.ts\nalias Flag = boolean;");
    assert_eq!(conversion.errors.len(), 1);
    assert!(conversion.errors[0].to_string().contains("nonesuch.ts"));
}

#[test]
fn test_compiler_diagnostics_locate_into_the_document() {
    let project = Project::from_yaml(indoc! {"
        types:
          - kind: opaque
            display: Bogus
          - kind: object
            symbol: Holder
            properties:
              - { name: value, type: 0 }
        units:
          holder.ts:
            declarations:
              - { name: Holder, type: 1, docs: { tags: [{ name: model }] } }
    "})
    .unwrap();
    let document = convert_all(&project);

    // What the schema compiler would report against the document,
    // keyed by byte offset.
    let offset = document.find("Bogus").unwrap();
    let diagnostics: Vec<Diagnostic> = serde_json::from_str(&format!(
        r#"[
            {{ "severity": "error", "message": "unknown identifier Bogus", "offset": {offset} }},
            {{ "severity": "warning", "message": "style nit" }}
        ]"#
    ))
    .unwrap();

    let index = LineIndex::new(&document);
    let errors: Vec<String> = diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.is_error())
        .map(|diagnostic| diagnostic.located("main.tsp", &index))
        .collect();
    assert_eq!(errors, vec!["unknown identifier Bogus @ main.tsp:3:10"]);
}
