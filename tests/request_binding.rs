mod common;

use common::*;
use soapbind::binding::bound::{expect_object, field};
use soapbind::binding::ConversionError;
use soapbind::{
    BindError, BoundMessage, BoundValue, ComplexType, FaultCode, FromBound, MessageBinder, Method,
    ObjectGraph, RpcLiteralRequestBinder, TypeRepository,
};
use soapbind_wire::{StructId, WireGraph, WireValue, ITEM_KEY};

#[derive(Debug, PartialEq)]
struct Foo {
    foo: String,
    bar: i64,
}

impl FromBound for Foo {
    fn from_bound(value: &BoundValue, objects: &ObjectGraph) -> Result<Self, ConversionError> {
        let object = expect_object(value, objects, FOO)?;
        Ok(Foo {
            foo: field(object, "foo", objects)?,
            bar: field(object, "bar", objects)?,
        })
    }
}

fn bind(
    method: &Method,
    graph: &WireGraph,
    arguments: &[WireValue],
    repository: &TypeRepository,
) -> Result<BoundMessage, BindError> {
    RpcLiteralRequestBinder.process_message(method, graph, arguments, repository)
}

fn foo_struct(graph: &mut WireGraph, foo: &str, bar: impl Into<WireValue>) -> StructId {
    graph.add_struct(vec![("foo", WireValue::from(foo)), ("bar", bar.into())])
}

#[test]
fn no_argument() {
    let method = Method::builder("no_argument").build();
    let bound = bind(&method, &WireGraph::new(), &[], &type_repository()).expect("bind");
    assert!(bound.is_empty());
    assert!(bound.objects().is_empty());
}

#[test]
fn string_argument() {
    let method = Method::builder("string_argument").input("foo", "string").build();
    let bound =
        bind(&method, &WireGraph::new(), &["bar".into()], &type_repository()).expect("bind");

    assert_eq!(bound.len(), 1);
    assert_eq!(bound.get("foo"), Some(&BoundValue::String("bar".to_string())));
}

#[test]
fn string_int_arguments() {
    let method = Method::builder("string_int_arguments")
        .input("foo", "string")
        .input("bar", "int")
        .build();
    let bound = bind(
        &method,
        &WireGraph::new(),
        &["test".into(), 20.into()],
        &type_repository(),
    )
    .expect("bind");

    assert_eq!(bound.names(), vec!["foo", "bar"]);
    assert_eq!(bound.get("foo"), Some(&BoundValue::from("test")));
    assert_eq!(bound.get("bar"), Some(&BoundValue::Int(20)));
}

#[test]
fn scalars_pass_through_unchanged() {
    let method = Method::builder("scalars")
        .input("flag", "boolean")
        .input("ratio", "float")
        .input("day", "date")
        .input("nothing", "string")
        .build();
    let arguments = vec![
        WireValue::Bool(true),
        WireValue::Float(0.25),
        WireValue::from("2024-02-29"),
        WireValue::Null,
    ];
    let bound = bind(&method, &WireGraph::new(), &arguments, &type_repository()).expect("bind");

    assert_eq!(bound.get("flag"), Some(&BoundValue::Bool(true)));
    assert_eq!(bound.get("ratio"), Some(&BoundValue::Float(0.25)));
    assert_eq!(bound.get("day"), Some(&BoundValue::from("2024-02-29")));
    assert_eq!(bound.get("nothing"), Some(&BoundValue::Null));
}

#[test]
fn array_string_arguments() {
    let method = Method::builder("array_string_arguments")
        .input("foo", "string[]")
        .input("bar", "int")
        .build();
    let mut graph = WireGraph::new();
    let strings = graph.add_struct(vec![(ITEM_KEY, vec!["foo", "bar", "barfoo"])]);

    let bound =
        bind(&method, &graph, &[strings.into(), 4.into()], &type_repository()).expect("bind");

    assert_eq!(
        bound.get("foo"),
        Some(&BoundValue::from(vec!["foo", "bar", "barfoo"]))
    );
    assert_eq!(bound.get("bar"), Some(&BoundValue::Int(4)));
    assert_eq!(
        bound.extract::<Vec<String>>("foo").expect("strings"),
        vec!["foo", "bar", "barfoo"]
    );
}

#[test]
fn empty_array() {
    let method = Method::builder("empty_array").input("foo", "string[]").build();
    let mut graph = WireGraph::new();
    let empty = graph.add_empty();

    let bound = bind(&method, &graph, &[empty.into()], &type_repository()).expect("bind");
    assert_eq!(bound.get("foo"), Some(&BoundValue::Array(Vec::new())));
}

#[test]
fn single_item_array_is_collapsed_on_the_wire() {
    let method = Method::builder("single_item").input("foo", "string[]").build();
    let mut graph = WireGraph::new();
    let single = graph.add_struct(vec![(ITEM_KEY, "only")]);

    let bound = bind(&method, &graph, &[single.into()], &type_repository()).expect("bind");
    assert_eq!(bound.get("foo"), Some(&BoundValue::from(vec!["only"])));
}

#[test]
fn bare_scalar_in_array_slot_is_a_single_item() {
    let method = Method::builder("array_string_arguments")
        .input("foo", "string[]")
        .input("bar", "int")
        .build();

    let bound = bind(
        &method,
        &WireGraph::new(),
        &["bar".into(), 4.into()],
        &type_repository(),
    )
    .expect("bind");

    assert_eq!(bound.get("foo"), Some(&BoundValue::from(vec!["bar"])));
    assert_eq!(bound.get("bar"), Some(&BoundValue::Int(4)));
}

#[test]
fn bare_struct_in_array_slot_is_a_single_item() {
    let method = Method::builder("complextype_argument").input("foos", "Foo[]").build();
    let mut graph = WireGraph::new();
    let foo = foo_struct(&mut graph, "x", 1);

    let bound = bind(&method, &graph, &[foo.into()], &full_repository()).expect("bind");

    let foos = bound.get("foos").and_then(BoundValue::as_array).expect("array");
    assert_eq!(foos.len(), 1);
    let id = foos[0].as_object().expect("object");
    assert_eq!(bound.object(id).map(|o| o.type_name.as_str()), Some(FOO));
    assert_eq!(
        bound.extract::<Vec<Foo>>("foos").expect("convert"),
        vec![Foo {
            foo: "x".to_string(),
            bar: 1
        }]
    );
}

#[test]
fn bare_scalar_in_complex_array_slot_is_rejected_per_item() {
    let method = Method::builder("complextype_argument").input("foos", "Foo[]").build();

    match bind(&method, &WireGraph::new(), &["x".into()], &full_repository()) {
        Err(BindError::UnexpectedValue { path, expected, .. }) => {
            assert_eq!(path, "foos[0]");
            assert_eq!(expected, FOO);
        }
        other => panic!("expected UnexpectedValue, got {:?}", other),
    }
}

#[test]
fn complex_type_argument() {
    let method = Method::builder("complextype_argument").input("foo", FOO).build();
    let mut graph = WireGraph::new();
    let foo = foo_struct(&mut graph, "foobar", 19395);

    let bound = bind(&method, &graph, &[foo.into()], &full_repository()).expect("bind");

    let id = bound.get("foo").and_then(BoundValue::as_object).expect("object");
    let object = bound.object(id).expect("in graph");
    assert_eq!(object.type_name, FOO);
    assert_eq!(
        object.fields,
        vec![
            ("foo".to_string(), BoundValue::from("foobar")),
            ("bar".to_string(), BoundValue::Int(19395)),
        ]
    );
    assert_eq!(
        bound.extract::<Foo>("foo").expect("convert"),
        Foo {
            foo: "foobar".to_string(),
            bar: 19395
        }
    );
}

#[test]
fn complex_type_found_by_alias() {
    let method = Method::builder("complextype_argument").input("foo", "Foo").build();
    let mut graph = WireGraph::new();
    let foo = foo_struct(&mut graph, "foobar", 1);

    let bound = bind(&method, &graph, &[foo.into()], &full_repository()).expect("bind");
    let id = bound.get("foo").and_then(BoundValue::as_object).expect("object");
    assert_eq!(bound.object(id).map(|o| o.type_name.as_str()), Some(FOO));
}

#[test]
fn complex_type_array() {
    let method = Method::builder("complextype_argument").input("foos", "Foo[]").build();
    let mut graph = WireGraph::new();
    let foo1 = foo_struct(&mut graph, "foobar", 29291);
    let foo2 = foo_struct(&mut graph, "barfoo", 39392);
    let foos = graph.add_struct(vec![(ITEM_KEY, vec![foo1, foo2])]);

    let bound = bind(&method, &graph, &[foos.into()], &full_repository()).expect("bind");

    assert_eq!(
        bound.extract::<Vec<Foo>>("foos").expect("convert"),
        vec![
            Foo {
                foo: "foobar".to_string(),
                bar: 29291
            },
            Foo {
                foo: "barfoo".to_string(),
                bar: 39392
            },
        ]
    );
}

#[test]
fn missing_required_property_is_a_fault() {
    let method = Method::builder("complextype_argument").input("foo", FOO).build();
    let mut graph = WireGraph::new();
    let foo = foo_struct(&mut graph, "foo", WireValue::Null);

    let err = bind(&method, &graph, &[foo.into()], &full_repository()).expect_err("fault");
    assert_eq!(
        err,
        BindError::RequiredPropertyMissing {
            type_name: FOO.to_string(),
            property: "bar".to_string(),
        }
    );
    assert_eq!(err.fault().code, FaultCode::Client);
}

#[test]
fn absent_required_property_is_a_fault() {
    let method = Method::builder("complextype_argument").input("foo", FOO).build();
    let mut graph = WireGraph::new();
    let foo = graph.add_struct(vec![("foo", "only foo")]);

    match bind(&method, &graph, &[foo.into()], &full_repository()) {
        Err(BindError::RequiredPropertyMissing { property, .. }) => assert_eq!(property, "bar"),
        other => panic!("expected RequiredPropertyMissing, got {:?}", other),
    }
}

#[test]
fn fault_aborts_the_whole_message() {
    let method = Method::builder("two_foos")
        .input("first", FOO)
        .input("second", FOO)
        .build();
    let mut graph = WireGraph::new();
    let good = foo_struct(&mut graph, "good", 1);
    let bad = graph.add_struct(vec![("foo", "bad")]);

    let result = bind(&method, &graph, &[good.into(), bad.into()], &full_repository());
    assert!(matches!(result, Err(BindError::RequiredPropertyMissing { .. })));
}

#[test]
fn same_instance_binds_to_one_object() {
    let method = Method::builder("complextype_argument").input("foos", "Foo[]").build();
    let mut graph = WireGraph::new();
    let foo = foo_struct(&mut graph, "foo", 2499104);
    let foos = graph.add_struct(vec![(ITEM_KEY, vec![foo, foo])]);

    let bound = bind(&method, &graph, &[foos.into()], &full_repository()).expect("bind");

    let items = bound.get("foos").and_then(BoundValue::as_array).expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], items[1]);
    assert_eq!(bound.objects().len(), 1);
}

#[test]
fn equal_but_independent_instances_stay_distinct() {
    let method = Method::builder("complextype_argument").input("foos", "Foo[]").build();
    let mut graph = WireGraph::new();
    let first = foo_struct(&mut graph, "foo", 7);
    let second = foo_struct(&mut graph, "foo", 7);
    let foos = graph.add_struct(vec![(ITEM_KEY, vec![first, second])]);

    let bound = bind(&method, &graph, &[foos.into()], &full_repository()).expect("bind");

    let items = bound.get("foos").and_then(BoundValue::as_array).expect("array");
    assert_ne!(items[0], items[1]);
    assert_eq!(bound.objects().len(), 2);
    let objects: Vec<_> = items
        .iter()
        .filter_map(BoundValue::as_object)
        .filter_map(|id| bound.object(id))
        .collect();
    assert_eq!(objects[0], objects[1]);
}

#[test]
fn complex_type_into_complex_type() {
    let method = Method::builder("complextype_argument").input("fooBar", FOO_BAR).build();
    let mut graph = WireGraph::new();
    let foo = foo_struct(&mut graph, "foo", 38845);
    let bar = graph.add_struct(vec![("foo", WireValue::from("bar")), ("bar", WireValue::Null)]);
    let foo_bar = graph.add_struct(vec![("foo", foo), ("bar", bar)]);

    let bound = bind(&method, &graph, &[foo_bar.into()], &full_repository()).expect("bind");

    let foo_bar = bound
        .get("fooBar")
        .and_then(BoundValue::as_object)
        .and_then(|id| bound.object(id))
        .expect("FooBar");
    assert_eq!(foo_bar.type_name, FOO_BAR);

    let bar = foo_bar
        .field("bar")
        .and_then(BoundValue::as_object)
        .and_then(|id| bound.object(id))
        .expect("Bar");
    assert_eq!(bar.type_name, BAR);
    assert_eq!(bar.field("foo"), Some(&BoundValue::from("bar")));
    assert_eq!(bar.field("bar"), Some(&BoundValue::Null));

    let foo = foo_bar.field("foo").expect("foo field");
    assert_eq!(
        Foo::from_bound(foo, bound.objects()).expect("convert"),
        Foo {
            foo: "foo".to_string(),
            bar: 38845
        }
    );
}

#[test]
fn complex_type_with_arrays() {
    let method = Method::builder("complextype_with_array")
        .input("simple_arrays", SIMPLE_ARRAYS)
        .build();
    let mut graph = WireGraph::new();
    let empty = graph.add_empty();
    let numbers = graph.add_struct(vec![(ITEM_KEY, vec![1, 2, 3, 4])]);
    let simple_arrays = graph.add_struct(vec![
        ("array1", WireValue::Null),
        ("array2", WireValue::Struct(empty)),
        ("array3", WireValue::Struct(numbers)),
    ]);

    let bound = bind(&method, &graph, &[simple_arrays.into()], &full_repository()).expect("bind");

    let object = bound
        .get("simple_arrays")
        .and_then(BoundValue::as_object)
        .and_then(|id| bound.object(id))
        .expect("SimpleArrays");
    assert_eq!(object.field("array1"), Some(&BoundValue::Null));
    assert_eq!(object.field("array2"), Some(&BoundValue::Array(Vec::new())));
    assert_eq!(object.field("array3"), Some(&BoundValue::from(vec![1, 2, 3, 4])));
}

#[test]
fn absent_nillable_array_property_is_empty() {
    let method = Method::builder("complextype_with_array")
        .input("simple_arrays", SIMPLE_ARRAYS)
        .build();
    let mut graph = WireGraph::new();
    let empty = graph.add_empty();
    let simple_arrays = graph.add_struct(vec![("array2", empty), ("array3", empty)]);

    let bound = bind(&method, &graph, &[simple_arrays.into()], &full_repository()).expect("bind");

    let object = bound
        .get("simple_arrays")
        .and_then(BoundValue::as_object)
        .and_then(|id| bound.object(id))
        .expect("SimpleArrays");
    assert_eq!(object.field("array1"), Some(&BoundValue::Array(Vec::new())));
}

#[test]
fn absent_required_array_property_is_a_fault() {
    let method = Method::builder("complextype_with_array")
        .input("simple_arrays", SIMPLE_ARRAYS)
        .build();
    let mut graph = WireGraph::new();
    let empty = graph.add_empty();
    let simple_arrays = graph.add_struct(vec![("array3", empty)]);

    match bind(&method, &graph, &[simple_arrays.into()], &full_repository()) {
        Err(BindError::RequiredPropertyMissing { type_name, property }) => {
            assert_eq!(type_name, SIMPLE_ARRAYS);
            assert_eq!(property, "array2");
        }
        other => panic!("expected RequiredPropertyMissing, got {:?}", other),
    }
}

#[test]
fn empty_array_of_complex_type() {
    let method = Method::builder("empty_array_complex_type").input("foo", "Foo[]").build();
    let mut graph = WireGraph::new();
    let empty = graph.add_empty();

    let bound = bind(&method, &graph, &[empty.into()], &full_repository()).expect("bind");
    assert_eq!(bound.get("foo"), Some(&BoundValue::Array(Vec::new())));
    assert!(bound.objects().is_empty());
}

#[test]
fn prevent_infinite_recursion() {
    let method = Method::builder("prevent_infinite_recursion")
        .input("foo_recursive", FOO_RECURSIVE)
        .build();
    let mut graph = WireGraph::new();
    let foo = graph.add_empty();
    let bar = graph.add_struct(vec![
        ("foo", WireValue::Struct(foo)),
        ("bar", WireValue::Int(10394)),
    ]);
    graph.set(foo, "bar", bar);

    let bound = bind(&method, &graph, &[foo.into()], &full_repository()).expect("bind");

    assert_eq!(bound.objects().len(), 2);
    let foo_id = bound.get("foo_recursive").and_then(BoundValue::as_object).expect("foo");
    let foo_object = bound.object(foo_id).expect("FooRecursive");
    assert_eq!(foo_object.type_name, FOO_RECURSIVE);

    let bar_id = foo_object.field("bar").and_then(BoundValue::as_object).expect("bar");
    let bar_object = bound.object(bar_id).expect("BarRecursive");
    assert_eq!(bar_object.type_name, BAR_RECURSIVE);
    // Only declared properties are bound
    assert_eq!(bar_object.fields.len(), 1);
    assert_eq!(bar_object.field("foo"), Some(&BoundValue::Object(foo_id)));
}

#[test]
fn missing_trailing_arguments() {
    let method = Method::builder("trailing")
        .input("name", "string")
        .input("tags", "string[]")
        .input("foo", FOO)
        .build();

    let bound = bind(&method, &WireGraph::new(), &["x".into()], &full_repository()).expect("bind");

    assert_eq!(bound.names(), vec!["name", "tags"]);
    assert_eq!(bound.get("tags"), Some(&BoundValue::Array(Vec::new())));
    assert!(!bound.contains("foo"));
}

#[test]
fn surplus_arguments_are_ignored() {
    let method = Method::builder("string_argument").input("foo", "string").build();
    let bound = bind(
        &method,
        &WireGraph::new(),
        &["bar".into(), "extra".into()],
        &type_repository(),
    )
    .expect("bind");
    assert_eq!(bound.len(), 1);
}

#[test]
fn unknown_type_fails_fast() {
    let method = Method::builder("unknown").input("foo", "Baz").build();
    let err =
        bind(&method, &WireGraph::new(), &["x".into()], &type_repository()).expect_err("fault");
    assert_eq!(err, BindError::UnknownType("Baz".to_string()));
    assert_eq!(err.fault().code, FaultCode::Server);
}

#[test]
fn unknown_property_type_fails_even_when_absent() {
    let mut repository = type_repository();
    repository.add_complex_type(
        ComplexType::builder("Broken")
            .property("name", "string")
            .nillable_property("extra", "Missing")
            .build(),
    );
    let method = Method::builder("broken").input("value", "Broken").build();
    let mut graph = WireGraph::new();
    let value = graph.add_struct(vec![("name", "x")]);

    let err = bind(&method, &graph, &[value.into()], &repository).expect_err("fault");
    assert_eq!(err, BindError::UnknownType("Missing".to_string()));
}

#[test]
fn shape_mismatch_is_reported_with_path() {
    let method = Method::builder("complextype_argument").input("fooBar", FOO_BAR).build();
    let mut graph = WireGraph::new();
    let bar = graph.add_struct(vec![("foo", WireValue::from("bar"))]);
    let foo_bar = graph.add_struct(vec![
        ("foo", WireValue::List(vec![WireValue::Int(1)])),
        ("bar", WireValue::Struct(bar)),
    ]);

    match bind(&method, &graph, &[foo_bar.into()], &full_repository()) {
        Err(BindError::UnexpectedValue { path, expected, found }) => {
            assert_eq!(path, "fooBar.foo");
            assert_eq!(expected, FOO);
            assert_eq!(found, "list");
        }
        other => panic!("expected UnexpectedValue, got {:?}", other),
    }
}

#[test]
fn struct_for_scalar_is_rejected() {
    let method = Method::builder("string_argument").input("foo", "string").build();
    let mut graph = WireGraph::new();
    let value = graph.add_empty();

    let err = bind(&method, &graph, &[value.into()], &type_repository()).expect_err("fault");
    assert!(err.is_client_error());
}

#[test]
fn dangling_struct_reference() {
    let method = Method::builder("complextype_argument").input("foo", FOO).build();
    let err = bind(
        &method,
        &WireGraph::new(),
        &[WireValue::Struct(StructId(3))],
        &full_repository(),
    )
    .expect_err("fault");
    assert_eq!(err, BindError::DanglingStruct(StructId(3)));
}

#[test]
fn renamed_property_uses_original_name_on_the_object() {
    let mut repository = type_repository();
    repository.add_complex_type(
        ComplexType::builder("Person")
            .original_name("app::Person")
            .add(soapbind::Property::new("first_name", "string").with_original_name("firstName"))
            .build(),
    );
    let method = Method::builder("greet").input("person", "Person").build();
    let mut graph = WireGraph::new();
    let person = graph.add_struct(vec![("first_name", "Ada")]);

    let bound = bind(&method, &graph, &[person.into()], &repository).expect("bind");
    let object = bound
        .get("person")
        .and_then(BoundValue::as_object)
        .and_then(|id| bound.object(id))
        .expect("Person");
    assert_eq!(object.field("firstName"), Some(&BoundValue::from("Ada")));
    assert_eq!(object.field("first_name"), None);
}
