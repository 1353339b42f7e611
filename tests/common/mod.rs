//! Shared fixtures for the binding tests.

#![allow(dead_code)]

use soapbind::{ComplexType, TypeRepository};

pub const FOO: &str = "fixtures::Foo";
pub const BAR: &str = "fixtures::Bar";
pub const FOO_BAR: &str = "fixtures::FooBar";
pub const SIMPLE_ARRAYS: &str = "fixtures::SimpleArrays";
pub const FOO_RECURSIVE: &str = "fixtures::FooRecursive";
pub const BAR_RECURSIVE: &str = "fixtures::BarRecursive";

/// Scalars only, as a service with no complex types would register.
pub fn type_repository() -> TypeRepository {
    let mut repository = TypeRepository::new();
    repository.add_xml_namespace("xsd", "http://www.w3.org/2001/XMLSchema");
    repository.add_type("string", "xsd:string");
    repository.add_type("boolean", "xsd:boolean");
    repository.add_type("int", "xsd:int");
    repository.add_type("float", "xsd:float");
    repository.add_type("date", "xsd:date");
    repository.add_type("dateTime", "xsd:dateTime");
    repository
}

pub fn with_complex_types(mut repository: TypeRepository) -> TypeRepository {
    repository.add_complex_type(
        ComplexType::builder("Foo")
            .original_name(FOO)
            .property("foo", "string")
            .property("bar", "int")
            .build(),
    );
    repository.add_complex_type(
        ComplexType::builder("Bar")
            .original_name(BAR)
            .property("foo", "string")
            .nillable_property("bar", "int")
            .build(),
    );
    repository.add_complex_type(
        ComplexType::builder("FooBar")
            .original_name(FOO_BAR)
            .property("foo", FOO)
            .property("bar", BAR)
            .build(),
    );
    repository.add_complex_type(
        ComplexType::builder("SimpleArrays")
            .original_name(SIMPLE_ARRAYS)
            .nillable_property("array1", "string[]")
            .property("array2", "string[]")
            .property("array3", "string[]")
            .build(),
    );
    repository.add_complex_type(
        ComplexType::builder("FooRecursive")
            .original_name(FOO_RECURSIVE)
            .property("bar", BAR_RECURSIVE)
            .build(),
    );
    repository.add_complex_type(
        ComplexType::builder("BarRecursive")
            .original_name(BAR_RECURSIVE)
            .property("foo", FOO_RECURSIVE)
            .build(),
    );
    repository
}

pub fn full_repository() -> TypeRepository {
    with_complex_types(type_repository())
}
