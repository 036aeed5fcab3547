/// Builds a [`Value`](crate::Value) from a literal-like syntax.
///
/// - `null`, `true`, `false`
/// - `[a, b, ...]` for an array
/// - `{ key: value, ... }` for a map (keys are values too)
/// - `Type { field: value, ... }` for a record (parenthesise it when nested)
/// - anything else goes through `Value::from`
///
/// ```rust
/// use propcodec::{value, Value};
///
/// let person = value!(Person { name: "Ann", tags: ["a", null] });
/// let record = person.as_record().unwrap();
/// assert_eq!(record.type_name(), "Person");
/// assert_eq!(record.get("tags").as_array().map(|a| a.len()), Some(2));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::ValueMap::new())
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ValueMap::new();
        $(
            map.insert($crate::value!($key), $crate::value!($value));
        )*
        $crate::Value::Map(map)
    }};

    (( $($inner:tt)+ )) => {
        $crate::value!($($inner)+)
    };

    ($name:ident { $($field:ident : $value:tt),* $(,)? }) => {{
        let mut record = $crate::Record::new(stringify!($name));
        $(
            record.set(stringify!($field), $crate::value!($value));
        )*
        $crate::Value::Record(record)
    }};

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Value, ValueMap};

    #[test]
    fn test_value_macro_primitives() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(42), Value::Int(42));
        assert_eq!(value!(42i64), Value::Long(42));
        assert_eq!(value!(3.5), Value::Double(3.5));
        assert_eq!(value!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_value_macro_arrays() {
        assert_eq!(value!([]), Value::Array(vec![]));
        assert_eq!(
            value!([null, "x", null]),
            Value::Array(vec![Value::Null, Value::from("x"), Value::Null])
        );
    }

    #[test]
    fn test_value_macro_maps() {
        assert_eq!(value!({}), Value::Map(ValueMap::new()));

        let map = value!({ "a": 1, 2: null });
        let map = map.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Value::from("a")), Some(&Value::Int(1)));
        assert_eq!(map.get(&Value::Int(2)), Some(&Value::Null));
    }

    #[test]
    fn test_value_macro_nested_records() {
        let line = value!(Line { from: (Point { x: 0 }), to: (Point { x: 3 }) });
        let line = line.as_record().unwrap();
        assert_eq!(line.get("to").as_record().unwrap().get("x"), &Value::Int(3));
    }

    #[test]
    fn test_value_macro_records_drop_nulls() {
        let point = value!(Point { x: 1, y: null });
        let record = point.as_record().unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("x"), &Value::Int(1));
    }
}
