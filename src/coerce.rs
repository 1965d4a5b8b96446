//! Converting one source string into one field.
//!
//! A custom [`Capability`] always wins. Without one, the field's [`Target`]
//! decides the grammar:
//!
//! | Target      | Accepted input                                         |
//! |-------------|--------------------------------------------------------|
//! | string      | anything, verbatim                                     |
//! | integers    | `42`, `-7`, `0x2a`, `0o52`, `052`, `0b101010`, `1_000` |
//! | bool        | `1 t T TRUE true True`, `0 f F FALSE false False`      |
//! | float       | `1.5`, `-2e10`, `inf`                                  |
//! | duration    | `300ms`, `1.5h`, `2h45m`, `0`                          |
//! | pointer     | whatever the pointee accepts                           |
//! | sequence    | `len=N`                                                |
//! | array       | `a,b,c` (at most the array's size)                     |
//! | mapping     | `k1:v1,k2:v2`                                          |
//!
//! Composite values are built aside and swapped into the field only once
//! every element converted.

use log::{debug, trace};

use crate::capability::Capability;
use crate::duration::parse_duration;
use crate::error::CoerceError;
use crate::parse::{parse_bool, parse_int, parse_uint};
use crate::path::FieldPath;
use crate::populate::Populator;
use crate::value::{Array, Example, FloatSlot, Mapping, Pointer, Sequence, Target};

/// Coerce `value` into `field` using the built-in rules.
///
/// Struct elements of sequences and arrays are populated from their tag
/// defaults. Use [`Populator`] to populate them from other sources.
pub fn coerce(value: &str, field: &mut dyn Example) -> Result<(), CoerceError> {
    let root = FieldPath::root();
    Coercer {
        populator: None,
        path: &root,
    }
    .coerce(value, field)
}

/// Coercion of one field, with the context needed to populate struct
/// elements of composite fields. Without a populator, elements are populated
/// from their tags only.
pub(crate) struct Coercer<'p> {
    populator: Option<&'p Populator>,
    path: &'p FieldPath,
}

impl<'p> Coercer<'p> {
    pub(crate) fn new(populator: &'p Populator, path: &'p FieldPath) -> Self {
        Self {
            populator: Some(populator),
            path,
        }
    }

    pub(crate) fn coerce(&self, value: &str, field: &mut dyn Example) -> Result<(), CoerceError> {
        let capability = field.capability();
        if capability != Capability::None {
            trace!("{}: {capability} into {}", self.path, field.type_name());
            return field.invoke(capability, value);
        }

        let type_name = field.type_name();
        match field.target() {
            Target::Str(slot) => *slot = value.to_string(),
            Target::Int(slot) => {
                let parsed = parse_int(value, slot.bits())?;
                slot.store(parsed);
            }
            Target::Uint(slot) => {
                let parsed = parse_uint(value, slot.bits())?;
                slot.store(parsed);
            }
            Target::Bool(slot) => *slot = parse_bool(value)?,
            Target::Float(FloatSlot::F32(slot)) => *slot = parse_float(value)?,
            Target::Float(FloatSlot::F64(slot)) => *slot = parse_float(value)?,
            Target::Duration(slot) => *slot = parse_duration(value)?,
            Target::Pointer(pointer) => return self.coerce_pointer(value, pointer),
            Target::Sequence(sequence) => return self.coerce_sequence(value, sequence),
            Target::Array(array) => return self.coerce_array(value, array),
            Target::Mapping(mapping) => return self.coerce_mapping(value, mapping),
            Target::Struct(_) | Target::Opaque => {
                debug!("{}: nothing to assign into {type_name}", self.path);
            }
        }
        Ok(())
    }

    fn coerce_pointer(&self, value: &str, pointer: &mut dyn Pointer) -> Result<(), CoerceError> {
        let was_null = pointer.is_null();
        let result = self.coerce(value, pointer.get_or_alloc());
        if result.is_err() && was_null {
            pointer.reset();
        }
        result
    }

    fn coerce_sequence(&self, value: &str, sequence: &mut dyn Sequence) -> Result<(), CoerceError> {
        let len = sequence_len(value);
        trace!("{}: building {len} elements", self.path);
        sequence.rebuild(len, &mut |index: usize, element: &mut dyn Example| {
            self.populate_element(index, element)
        })
    }

    fn coerce_array(&self, value: &str, array: &mut dyn Array) -> Result<(), CoerceError> {
        if array.flattens_elements() {
            return array.rebuild(&mut |index: usize, element: &mut dyn Example| {
                self.populate_element(index, element)
            });
        }

        let items = split_list(value);
        if items.len() > array.size() {
            return Err(CoerceError::TooManyElements {
                expected: array.size(),
                found: items.len(),
            });
        }
        array.rebuild(&mut |index: usize, element: &mut dyn Example| {
            match items.get(index) {
                Some(item) => self.coerce(item, element),
                None => Ok(()),
            }
        })
    }

    fn coerce_mapping(&self, value: &str, mapping: &mut dyn Mapping) -> Result<(), CoerceError> {
        let entries = parse_entries(value)?;
        mapping.rebuild(&entries, &mut |text: &str, slot: &mut dyn Example| {
            self.coerce(text, slot)
        })
    }

    /// Populate a struct element of a sequence or array from the layered
    /// sources, whether or not it has a capability. Other elements keep their
    /// default value.
    fn populate_element(&self, index: usize, element: &mut dyn Example) -> Result<(), CoerceError> {
        if !matches!(element.target(), Target::Struct(_)) {
            return Ok(());
        }
        let path = self.path.index(index);
        let result = match self.populator {
            Some(populator) => populator.populate_at(element, &path),
            None => Populator::default().populate_at(element, &path),
        };
        result.map_err(|source| CoerceError::Element {
            index,
            source: Box::new(source),
        })
    }
}

fn parse_float<F>(value: &str) -> Result<F, CoerceError>
where
    F: std::str::FromStr<Err = std::num::ParseFloatError>,
{
    value.parse().map_err(|source| CoerceError::InvalidFloat {
        value: value.to_string(),
        source,
    })
}

/// The `N` of a `len=N` marker. Zero when the marker is missing or malformed.
pub(crate) fn sequence_len(value: &str) -> usize {
    let mut parts = value.split("len=");
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(count), None) => count.parse().unwrap_or(0),
        _ => 0,
    }
}

fn split_list(value: &str) -> Vec<&str> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split(',').collect()
}

/// Split `k1:v1,k2:v2` into pairs. Every pair must hold exactly one colon.
pub(crate) fn parse_entries(value: &str) -> Result<Vec<(&str, &str)>, CoerceError> {
    split_list(value)
        .into_iter()
        .map(|pair| {
            let mut parts = pair.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Ok((key, value)),
                _ => Err(CoerceError::InvalidMapItem {
                    pair: pair.to_string(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    use super::*;
    use crate::capability::Set;
    use crate::tag::Tag;
    use crate::value::{Field, Struct};

    /// A struct that also decodes itself through `Set`.
    #[derive(Debug, Default, PartialEq)]
    struct Level {
        name: String,
    }

    impl Set for Level {
        type Error = std::convert::Infallible;

        fn set(&mut self, value: &str) -> Result<(), Self::Error> {
            self.name = format!("set:{value}");
            Ok(())
        }
    }

    impl Example for Level {
        fn is_struct() -> bool {
            true
        }

        fn capability(&self) -> Capability {
            crate::capabilities!(Self).resolve()
        }

        fn invoke(&mut self, capability: Capability, value: &str) -> Result<(), CoerceError> {
            crate::capabilities!(Self).invoke(self, capability, value)
        }

        fn target(&mut self) -> Target<'_> {
            Target::Struct(self)
        }
    }

    impl Struct for Level {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::new(
                "name",
                Tag::new().with_default("tagged"),
                &mut self.name,
            )]
        }
    }

    fn level(name: &str) -> Level {
        Level { name: name.into() }
    }

    #[test]
    fn strings_are_verbatim() {
        let mut value = String::from("old");
        coerce("  spaced value ", &mut value).unwrap();
        assert_eq!(value, "  spaced value ");
    }

    #[test]
    fn integers_by_width() {
        let mut small = 0i8;
        let mut wide = 0i64;
        let mut unsigned = 0u32;
        coerce("-12", &mut small).unwrap();
        coerce("0x7fffffffffffffff", &mut wide).unwrap();
        coerce("0b1010", &mut unsigned).unwrap();
        assert_eq!(small, -12);
        assert_eq!(wide, i64::MAX);
        assert_eq!(unsigned, 10);
    }

    #[test]
    fn out_of_range_leaves_field_untouched() {
        let mut value = 7u8;
        let err = coerce("300", &mut value).unwrap_err();
        assert!(matches!(err, CoerceError::IntOutOfRange { bits: 8, .. }));
        assert_eq!(value, 7);
    }

    #[test]
    fn bools_and_floats() {
        let mut flag = false;
        let mut ratio = 0f32;
        let mut precise = 0f64;
        coerce("T", &mut flag).unwrap();
        coerce("0.25", &mut ratio).unwrap();
        coerce("-1e3", &mut precise).unwrap();
        assert!(flag);
        assert_eq!(ratio, 0.25);
        assert_eq!(precise, -1000.0);

        let err = coerce("bogus", &mut flag).unwrap_err();
        assert!(matches!(err, CoerceError::InvalidBool { .. }));
        assert!(flag);
        assert!(matches!(
            coerce("1.2.3", &mut precise),
            Err(CoerceError::InvalidFloat { .. })
        ));
    }

    #[test]
    fn durations() {
        let mut timeout = Duration::default();
        coerce("1m30s", &mut timeout).unwrap();
        assert_eq!(timeout, Duration::from_secs(90));
        assert!(matches!(
            coerce("90", &mut timeout),
            Err(CoerceError::InvalidDuration(_))
        ));
    }

    #[test]
    fn pointer_is_allocated_on_assignment() {
        let mut value: Option<i32> = None;
        coerce("42", &mut value).unwrap();
        assert_eq!(value, Some(42));
    }

    #[test]
    fn pointer_stays_empty_on_failure() {
        let mut value: Option<i32> = None;
        assert!(coerce("forty-two", &mut value).is_err());
        assert_eq!(value, None);
    }

    #[test]
    fn filled_pointer_keeps_value_on_failure() {
        let mut value = Some(Box::new(3u16));
        assert!(coerce("-1", &mut value).is_err());
        assert_eq!(value, Some(Box::new(3)));
    }

    #[test]
    fn sequence_length_marker() {
        assert_eq!(sequence_len("len=3"), 3);
        assert_eq!(sequence_len("size;len=2"), 2);
        assert_eq!(sequence_len(""), 0);
        assert_eq!(sequence_len("len=x"), 0);
        assert_eq!(sequence_len("len=-1"), 0);
        assert_eq!(sequence_len("len=1len=2"), 0);
    }

    #[test]
    fn scalar_sequence_elements_stay_default() {
        let mut items = vec![5u8];
        coerce("len=2", &mut items).unwrap();
        assert_eq!(items, vec![0, 0]);

        coerce("john,doe", &mut items).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn array_from_positional_list() {
        let mut items = [9i32; 5];
        coerce("2,3,5,6", &mut items).unwrap();
        assert_eq!(items, [2, 3, 5, 6, 0]);

        coerce("", &mut items).unwrap();
        assert_eq!(items, [0; 5]);
    }

    #[test]
    fn array_of_capability_structs_uses_positional_items() {
        let mut items: [Level; 2] = Default::default();
        coerce("a,b", &mut items).unwrap();
        assert_eq!(items, [level("set:a"), level("set:b")]);

        coerce("c", &mut items).unwrap();
        assert_eq!(items, [level("set:c"), Level::default()]);

        assert!(matches!(
            coerce("a,b,c", &mut items),
            Err(CoerceError::TooManyElements {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn sequence_of_capability_structs_is_populated_from_tags() {
        let mut items: Vec<Level> = Vec::new();
        coerce("len=2", &mut items).unwrap();
        assert_eq!(items, vec![level("tagged"), level("tagged")]);
    }

    #[test]
    fn unallocatable_sequence_length_is_an_error() {
        let mut items = vec![3u8];
        let err = coerce(&format!("len={}", usize::MAX), &mut items).unwrap_err();
        assert!(matches!(err, CoerceError::SequenceTooLong { .. }));
        assert_eq!(items, vec![3]);
    }

    #[test]
    fn mapping_values_use_their_capability() {
        let mut map: BTreeMap<String, Level> = BTreeMap::new();
        coerce("x:debug,y:warn", &mut map).unwrap();
        assert_eq!(
            map,
            BTreeMap::from([
                ("x".to_string(), level("set:debug")),
                ("y".to_string(), level("set:warn")),
            ])
        );
    }

    #[test]
    fn array_rejects_extra_items() {
        let mut items = [1u8; 2];
        let err = coerce("1,2,3", &mut items).unwrap_err();
        assert!(matches!(
            err,
            CoerceError::TooManyElements {
                expected: 2,
                found: 3
            }
        ));
        assert_eq!(items, [1, 1]);
    }

    #[test]
    fn array_element_error_keeps_contents() {
        let mut items = [1u8; 3];
        assert!(coerce("4,x", &mut items).is_err());
        assert_eq!(items, [1, 1, 1]);
    }

    #[test]
    fn mapping_pairs() {
        let mut map: HashMap<String, i32> = HashMap::new();
        coerce("a:1,b:2", &mut map).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 1);
        assert_eq!(map["b"], 2);
    }

    #[test]
    fn mapping_last_write_wins() {
        let mut map: BTreeMap<u8, bool> = BTreeMap::new();
        coerce("1:true,2:f,1:0", &mut map).unwrap();
        assert_eq!(map, BTreeMap::from([(1, false), (2, false)]));
    }

    #[test]
    fn blank_mapping_is_empty() {
        let mut map: HashMap<String, String> = HashMap::from([("x".into(), "y".into())]);
        coerce("   ", &mut map).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn malformed_pair_names_the_pair() {
        let mut map: HashMap<String, String> = HashMap::new();
        let err = coerce("a:1,b", &mut map).unwrap_err();
        assert_eq!(err.to_string(), "invalid map item: \"b\"");

        let err = coerce("a:1:2", &mut map).unwrap_err();
        assert!(matches!(err, CoerceError::InvalidMapItem { pair } if pair == "a:1:2"));
        assert!(map.is_empty());
    }

    #[test]
    fn mapping_value_errors_propagate() {
        let mut map: HashMap<String, u8> = HashMap::from([("keep".into(), 1)]);
        assert!(matches!(
            coerce("a:1,b:x", &mut map),
            Err(CoerceError::InvalidInt { .. })
        ));
        assert_eq!(map.len(), 1);
    }
}
