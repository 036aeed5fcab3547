//! Wire-format scenarios: exact tree shapes and byte layouts, chunked decoding and the
//! error cases every decoder must report.

use chrono::NaiveDate;
use propcodec::{
    value, CodecOptions, Collection, Descriptor, Element, PropertyDescription,
    Record, RecordDescription, Registry, Value, ValueMap, ELEMENT_SIZE_ESTIMATE,
};
use std::sync::Arc;

fn register(registry: &mut Registry, desc: RecordDescription) -> Arc<Descriptor> {
    registry.register_record(desc).unwrap()
}

fn holder(property: PropertyDescription) -> RecordDescription {
    RecordDescription::new("Holder").with_property(property)
}

fn batches_of_64() -> CodecOptions {
    CodecOptions::new().with_chunk_budget(64 * ELEMENT_SIZE_ESTIMATE)
}

fn items() -> PropertyDescription {
    PropertyDescription::new("items", "array")
        .with_element_tag("item")
        .with_element(PropertyDescription::new("", "string"))
}

#[test]
fn test_array_with_holes() {
    let mut registry = Registry::default();
    let holder = register(&mut registry, holder(items()));
    let record = value!(Holder { items: [null, "x", null] });
    let record = record.as_record().unwrap();

    let node = holder.to_tree(record).unwrap();
    let wrapper = node.first_matching("items", None).unwrap();
    assert_eq!(wrapper.children().len(), 3);
    assert!(wrapper.children().iter().all(|c| c.name() == "item"));
    assert!(wrapper.children()[0].is_blank());
    assert_eq!(wrapper.children()[1].content(), Some(&Value::from("x")));
    assert!(wrapper.children()[2].is_blank());
    assert_eq!(&holder.from_tree(&node).unwrap(), record);

    let adapter = holder.adapter("items").unwrap();
    let mut bytes = Vec::new();
    adapter.write_binary(&mut bytes, record.get("items")).unwrap();
    assert_eq!(bytes, [0, 0, 0, 3, 0, 1, 0, 0, 0, 1, b'x', 0]);
    assert_eq!(
        adapter.read_binary(&mut bytes.as_slice()).unwrap(),
        *record.get("items")
    );
}

#[test]
fn test_sparse_array_keeps_length_and_positions() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(
            PropertyDescription::new("slots", "array")
                .sparse()
                .with_element_tag("slot")
                .with_element(PropertyDescription::new("", "int")),
        ),
    );

    let mut slots = vec![Value::Null; 10];
    slots[0] = Value::Int(5);
    slots[9] = Value::Int(-5);
    let record = Record::new("Holder").with("slots", Value::Array(slots));

    let node = holder.to_tree(&record).unwrap();
    let wrapper = node.first_matching("slots", None).unwrap();
    assert_eq!(wrapper.attribute("length"), Some(&Value::Int(10)));
    let ids: Vec<&Value> = wrapper
        .children()
        .iter()
        .filter_map(|c| c.attribute("id"))
        .collect();
    assert_eq!(ids, [&Value::Int(0), &Value::Int(9)]);
    assert_eq!(holder.from_tree(&node).unwrap(), record);

    let token = holder.to_token(&record).unwrap();
    assert_eq!(holder.from_token(&token).unwrap(), record);
}

#[test]
fn test_sparse_element_without_id() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(
            PropertyDescription::new("slots", "array")
                .sparse()
                .with_element_tag("slot")
                .with_element(PropertyDescription::new("", "int")),
        ),
    );

    let mut node = Element::new("Holder");
    let wrapper = node.add_child("slots");
    wrapper.set_attribute("length", Value::Int(2));
    wrapper.add_child("slot").set_content(Value::Int(1));

    let err = holder.from_tree(&node).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("\"id\""));
}

#[test]
fn test_sparse_length_beyond_budget() {
    let slots = || {
        holder(
            PropertyDescription::new("slots", "array")
                .sparse()
                .with_element_tag("slot")
                .with_element(PropertyDescription::new("", "int")),
        )
    };
    let mut registry = Registry::default();
    let holder = register(&mut registry, slots());

    let mut node = Element::new("Holder");
    node.add_child("slots")
        .set_attribute("length", Value::Int(i32::MAX));
    let err = holder.from_tree(&node).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("2147483647"));

    // a small budget still admits lengths it can hold
    let mut small = Registry::new(batches_of_64());
    let holder = register(&mut small, slots());
    let node = |length: i32| {
        let mut node = Element::new("Holder");
        let wrapper = node.add_child("slots");
        wrapper.set_attribute("length", Value::Int(length));
        let slot = wrapper.add_child("slot");
        slot.set_attribute("id", Value::Int(63));
        slot.set_content(Value::Int(7));
        node
    };
    let decoded = holder.from_tree(&node(64)).unwrap();
    let items = decoded.get("slots").as_array().unwrap();
    assert_eq!(items.len(), 64);
    assert_eq!(items[63], Value::Int(7));

    assert!(holder.from_tree(&node(65)).unwrap_err().is_format());
}

#[test]
fn test_chunked_decode_matches_single_batch() {
    let desc = || {
        holder(
            PropertyDescription::new("values", "array")
                .with_element_tag("v")
                .with_element(PropertyDescription::new("", "long")),
        )
    };
    let mut chunked = Registry::new(batches_of_64());
    let mut whole = Registry::default();
    let small = register(&mut chunked, desc());
    let large = register(&mut whole, desc());

    for count in [63usize, 64, 65, 200] {
        let values: Vec<Value> = (0..count)
            .map(|i| {
                if i % 7 == 3 {
                    Value::Null
                } else {
                    Value::Long(i as i64 * 1_000_003)
                }
            })
            .collect();
        let record = Record::new("Holder").with("values", Value::Array(values));

        let bytes = propcodec::to_vec(&large, &record).unwrap();
        let a = propcodec::from_slice(&small, &bytes).unwrap();
        let b = propcodec::from_slice(&large, &bytes).unwrap();
        assert_eq!(a, b, "count {}", count);
        assert_eq!(a, record, "count {}", count);
    }
}

#[test]
fn test_oversized_count_fails_without_allocating() {
    let mut registry = Registry::new(batches_of_64());
    let holder = register(&mut registry, holder(items()));
    let adapter = holder.adapter("items").unwrap();

    // claims i32::MAX entries, holds one
    let bytes = [0x7f, 0xff, 0xff, 0xff, 1, 0, 0, 0, 1, b'x'];
    let err = adapter.read_binary(&mut &bytes[..]).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("read 1"));
}

#[test]
fn test_oversized_count_with_default_budget() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(items()).with_property(
            PropertyDescription::new("index", "map")
                .with_element_tag("entry")
                .with_key(PropertyDescription::new("", "string"))
                .with_value(PropertyDescription::new("", "string")),
        ),
    );

    let prefix = i32::MAX.to_be_bytes();
    for name in ["items", "index"] {
        let adapter = holder.adapter(name).unwrap();
        let err = adapter.read_binary(&mut &prefix[..]).unwrap_err();
        assert!(err.is_format(), "{}", name);
        assert!(err.to_string().contains("read 0"), "{}", name);
    }
}

#[test]
fn test_truncated_map_payload() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(
            PropertyDescription::new("index", "map")
                .with_element_tag("entry")
                .with_key(PropertyDescription::new("", "string"))
                .with_value(PropertyDescription::new("", "int")),
        ),
    );
    let adapter = holder.adapter("index").unwrap();

    let mut map = ValueMap::new();
    map.insert(Value::from("a"), Value::Int(1));
    map.insert(Value::from("b"), Value::Int(2));
    let mut bytes = Vec::new();
    adapter.write_binary(&mut bytes, &Value::Map(map)).unwrap();

    // declare three entries while holding two
    bytes[3] = 3;
    let err = adapter.read_binary(&mut bytes.as_slice()).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("expected 3 entries, read 2"));
}

#[test]
fn test_map_with_null_key_and_null_value() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(
            PropertyDescription::new("index", "map")
                .with_element_tag("entry")
                .with_key(PropertyDescription::new("", "string"))
                .with_value(PropertyDescription::new("", "int")),
        ),
    );

    let mut map = ValueMap::new();
    map.insert(Value::Null, Value::Int(1));
    map.insert(Value::from("k"), Value::Null);
    let record = Record::new("Holder").with("index", map);

    let node = holder.to_tree(&record).unwrap();
    assert_eq!(holder.from_tree(&node).unwrap(), record);
    let bytes = propcodec::to_vec(&holder, &record).unwrap();
    assert_eq!(propcodec::from_slice(&holder, &bytes).unwrap(), record);
}

fn shapes() -> (Registry, Arc<Descriptor>) {
    let mut registry = Registry::default();
    register(
        &mut registry,
        RecordDescription::new("Shape")
            .anonymous()
            .with_property(PropertyDescription::new("circle", "double"))
            .with_property(PropertyDescription::new("square", "int")),
    );
    register(
        &mut registry,
        RecordDescription::new("Point")
            .with_property(PropertyDescription::new("x", "int"))
            .with_property(PropertyDescription::new("y", "int")),
    );
    let drawing = register(
        &mut registry,
        RecordDescription::new("Drawing")
            .with_property(
                PropertyDescription::new("shapes", "collection")
                    .with_element_tag("shape")
                    .with_element(PropertyDescription::new("", "Shape")),
            )
            .with_property(
                PropertyDescription::new("points", "array")
                    .with_element_tag("point")
                    .with_element(PropertyDescription::new("", "Point").anonymous()),
            ),
    );
    (registry, drawing)
}

#[test]
fn test_empty_inner_compounds_survive_tree() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        RecordDescription::new("Holder")
            .with_property(
                PropertyDescription::new("rows", "array")
                    .with_element_tag("row")
                    .with_element(
                        PropertyDescription::new("", "array")
                            .with_element_tag("cell")
                            .with_element(PropertyDescription::new("", "int")),
                    ),
            )
            .with_property(
                PropertyDescription::new("groups", "collection")
                    .with_element_tag("group")
                    .with_element(
                        PropertyDescription::new("", "map")
                            .with_element_tag("entry")
                            .with_key(PropertyDescription::new("", "string"))
                            .with_value(PropertyDescription::new("", "long")),
                    ),
            ),
    );

    let mut counts = ValueMap::new();
    counts.insert(Value::from("a"), Value::Long(1));
    let record = Record::new("Holder")
        .with("rows", value!([[], [1], null]))
        .with(
            "groups",
            Value::Collection(Collection::list([
                Value::Map(ValueMap::new()),
                Value::Null,
                Value::Map(counts),
            ])),
        );

    let node = holder.to_tree(&record).unwrap();
    let rows = node.first_matching("rows", None).unwrap().children();
    assert!(rows[0].is_blank());
    assert_eq!(rows[2].attribute("nil"), Some(&Value::Bool(true)));
    assert_eq!(holder.from_tree(&node).unwrap(), record);

    let bytes = propcodec::to_vec(&holder, &record).unwrap();
    assert_eq!(propcodec::from_slice(&holder, &bytes).unwrap(), record);
}

#[test]
fn test_anonymous_element_hoists_single_child() {
    let (_, drawing) = shapes();
    let shapes = Collection::list([
        Value::Record(Record::new("Shape").with("square", 4)),
        Value::Record(Record::new("Shape").with("circle", 1.5)),
    ]);
    let record = Record::new("Drawing").with("shapes", shapes);

    let node = drawing.to_tree(&record).unwrap();
    let wrapper = node.first_matching("shapes", None).unwrap();
    let names: Vec<&str> = wrapper.children().iter().map(Element::name).collect();
    assert_eq!(names, ["square", "circle"]);
    assert_eq!(drawing.from_tree(&node).unwrap(), record);
}

#[test]
fn test_anonymous_element_with_several_children() {
    let (_, drawing) = shapes();
    let point = Value::Record(Record::new("Point").with("x", 1).with("y", 2));
    let record = Record::new("Drawing").with("points", Value::Array(vec![point]));

    let err = drawing.to_tree(&record).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("2 children"));
}

#[test]
fn test_empty_is_null_policy() {
    let collapsing = holder(items().empty_is_null());
    let keeping = holder(items());
    let empty = Record::new("Holder").with("items", Value::Array(vec![]));

    let mut registry = Registry::default();
    let holder = register(&mut registry, collapsing);
    let node = holder.to_tree(&empty).unwrap();
    assert!(node.children().is_empty());
    assert!(holder.from_tree(&node).unwrap().get("items").is_null());

    let mut registry = Registry::default();
    let holder = register(&mut registry, keeping);
    let node = holder.to_tree(&empty).unwrap();
    assert_eq!(node.children().len(), 1);
    assert!(node.children()[0].children().is_empty());
    assert_eq!(holder.from_tree(&node).unwrap(), empty);

    let bytes = propcodec::to_vec(&holder, &empty).unwrap();
    assert_eq!(bytes, [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_unparsable_date_decodes_to_epoch() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(PropertyDescription::new("born", "date")),
    );

    let mut node = Element::new("Holder");
    node.add_child("born").set_content(Value::from("the day after tomorrow"));
    let record = holder.from_tree(&node).unwrap();
    assert_eq!(
        record.get("born"),
        &Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    );
}

#[test]
fn test_unparsable_number_is_format_error() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        holder(PropertyDescription::new("count", "int")),
    );

    let mut node = Element::new("Holder");
    node.add_child("count").set_content(Value::from("twelve"));
    assert!(holder.from_tree(&node).unwrap_err().is_format());
}

#[test]
fn test_scalar_tokens() {
    let mut registry = Registry::default();
    let holder = register(
        &mut registry,
        RecordDescription::new("Holder")
            .with_property(PropertyDescription::new("n", "int"))
            .with_property(PropertyDescription::new("s", "string"))
            .with_property(PropertyDescription::new("d", "date")),
    );

    let n = holder.adapter("n").unwrap();
    assert_eq!(n.to_token(&Value::Int(-42)).unwrap(), "(42)");
    assert_eq!(n.from_token("(42)").unwrap(), Value::Int(-42));

    let s = holder.adapter("s").unwrap();
    let token = s.to_token(&Value::from("a b/€")).unwrap();
    assert_eq!(token, "a%20b%2Fu20AC");
    assert_eq!(s.from_token(&token).unwrap(), Value::from("a b/€"));

    let d = holder.adapter("d").unwrap();
    let date = Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(d.to_token(&date).unwrap(), "20240229");
}

#[test]
fn test_bad_token_is_format_error() {
    let mut registry = Registry::default();
    let holder = register(&mut registry, holder(items()));
    assert!(holder.from_token("not base64 !").unwrap_err().is_format());
    assert!(holder
        .adapter("items")
        .unwrap()
        .from_token("AAAA")
        .unwrap_err()
        .is_format());
}
