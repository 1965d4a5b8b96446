//! Field discovery: turning a struct into its ordered list of leaf fields.

use std::fmt;

use log::{debug, trace};

use crate::capability::Capability;
use crate::error::ExemplarError;
use crate::path::FieldPath;
use crate::tag::Tag;
use crate::value::{Example, Field, Struct, Target};

/// A leaf field found by [`discover`], borrowed from the live struct.
pub struct FieldDescriptor<'a> {
    /// Declared name of the field.
    pub name: &'static str,
    /// Location from the root struct, including flattened parents.
    pub path: FieldPath,
    pub tag: Tag,
    pub value: &'a mut dyn Example,
}

impl fmt::Debug for FieldDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("tag", &self.tag)
            .field("type", &self.value.type_name())
            .finish()
    }
}

/// Discover the leaf fields of `target`, in declaration order.
///
/// Ignored fields are skipped. Pointers are followed, and empty pointers to
/// struct types are allocated with their default value so their fields can
/// be reached. A struct-shaped field without a custom capability is replaced
/// by its own fields; with a capability it stays a single leaf.
///
/// Fails with [`ExemplarError::InvalidShape`] when `target` is not a struct.
pub fn discover(target: &mut dyn Example) -> Result<Vec<FieldDescriptor<'_>>, ExemplarError> {
    discover_at(target, &FieldPath::root())
}

pub(crate) fn discover_at<'a>(
    target: &'a mut dyn Example,
    prefix: &FieldPath,
) -> Result<Vec<FieldDescriptor<'a>>, ExemplarError> {
    let type_name = target.type_name();
    let Target::Struct(fields) = target.target() else {
        return Err(ExemplarError::InvalidShape { type_name });
    };
    let mut leaves = Vec::new();
    collect(fields, prefix, &mut leaves)?;
    trace!("discovered {} fields under {prefix}", leaves.len());
    Ok(leaves)
}

/// True for struct-shaped values that discovery splits into their fields.
pub(crate) fn is_flattenable(value: &mut dyn Example) -> bool {
    value.capability() == Capability::None && matches!(value.target(), Target::Struct(_))
}

fn collect<'a>(
    target: &'a mut dyn Struct,
    prefix: &FieldPath,
    leaves: &mut Vec<FieldDescriptor<'a>>,
) -> Result<(), ExemplarError> {
    for Field { name, tag, value } in target.fields() {
        let path = prefix.child(name);
        if tag.is_ignored() {
            debug!("skipping ignored field {path}");
            continue;
        }

        let value = follow_pointers(value, &path)?;
        if is_flattenable(value) {
            trace!("flattening {path} ({})", value.type_name());
            if let Target::Struct(inner) = value.target() {
                collect(inner, &path, leaves)?;
            }
        } else {
            trace!("leaf {path} ({})", value.type_name());
            leaves.push(FieldDescriptor {
                name,
                path,
                tag,
                value,
            });
        }
    }
    Ok(())
}

/// Dereference pointers until reaching a non-pointer or an empty pointer to
/// a non-struct type.
fn follow_pointers<'a>(
    mut value: &'a mut dyn Example,
    path: &FieldPath,
) -> Result<&'a mut dyn Example, ExemplarError> {
    loop {
        let descend = match value.target() {
            Target::Pointer(pointer) => !pointer.is_null() || pointer.pointee_is_struct(),
            _ => false,
        };
        if !descend {
            return Ok(value);
        }

        let type_name = value.type_name();
        value = match value.target() {
            Target::Pointer(pointer) => {
                if pointer.is_null() {
                    debug!("allocating {type_name} at {path}");
                }
                pointer.get_or_alloc()
            }
            _ => return Err(ExemplarError::InvalidShape { type_name }),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Inner {
        port: u16,
    }

    impl Example for Inner {
        fn is_struct() -> bool {
            true
        }

        fn target(&mut self) -> Target<'_> {
            Target::Struct(self)
        }
    }

    impl Struct for Inner {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::new("port", Tag::new().with_default("8080"), &mut self.port)]
        }
    }

    #[derive(Default)]
    struct Outer {
        name: String,
        skipped: String,
        inner: Inner,
        maybe: Option<Inner>,
        count: Option<u32>,
    }

    impl Example for Outer {
        fn is_struct() -> bool {
            true
        }

        fn target(&mut self) -> Target<'_> {
            Target::Struct(self)
        }
    }

    impl Struct for Outer {
        fn fields(&mut self) -> Vec<Field<'_>> {
            let Self {
                name,
                skipped,
                inner,
                maybe,
                count,
            } = self;
            vec![
                Field::new("name", Tag::new(), name),
                Field::new("skipped", Tag::new().ignore(), skipped),
                Field::new("inner", Tag::new(), inner),
                Field::new("maybe", Tag::new(), maybe),
                Field::new("count", Tag::new(), count),
            ]
        }
    }

    fn paths(leaves: &[FieldDescriptor<'_>]) -> Vec<String> {
        leaves.iter().map(|leaf| leaf.path.to_string()).collect()
    }

    #[test]
    fn rejects_non_struct() {
        let mut value = 5u8;
        let err = discover(&mut value).unwrap_err();
        assert!(matches!(err, ExemplarError::InvalidShape { type_name: "u8" }));
    }

    #[test]
    fn flattens_in_declaration_order() {
        let mut outer = Outer::default();
        let leaves = discover(&mut outer).unwrap();
        assert_eq!(paths(&leaves), vec!["name", "inner.port", "maybe.port", "count"]);
        assert_eq!(leaves[1].name, "port");
        assert_eq!(leaves[1].tag.default_value(), Some("8080"));
    }

    #[test]
    fn allocates_empty_struct_pointers() {
        let mut outer = Outer::default();
        discover(&mut outer).unwrap();
        assert!(outer.maybe.is_some());
    }

    #[test]
    fn leaves_empty_scalar_pointers_alone() {
        let mut outer = Outer::default();
        let mut leaves = discover(&mut outer).unwrap();
        assert!(matches!(leaves[3].value.target(), Target::Pointer(_)));
        drop(leaves);
        assert!(outer.count.is_none());
    }

    #[test]
    fn follows_filled_scalar_pointers() {
        let mut outer = Outer {
            count: Some(3),
            ..Outer::default()
        };
        let mut leaves = discover(&mut outer).unwrap();
        assert!(matches!(leaves[3].value.target(), Target::Uint(_)));
    }

    #[test]
    fn nested_boxes_are_followed() {
        #[derive(Default)]
        struct Holder {
            deep: Box<Option<Inner>>,
        }

        impl Example for Holder {
            fn target(&mut self) -> Target<'_> {
                Target::Struct(self)
            }
        }

        impl Struct for Holder {
            fn fields(&mut self) -> Vec<Field<'_>> {
                vec![Field::new("deep", Tag::new(), &mut self.deep)]
            }
        }

        let mut holder = Holder::default();
        let leaves = discover(&mut holder).unwrap();
        assert_eq!(paths(&leaves), vec!["deep.port"]);
        drop(leaves);
        assert!(holder.deep.is_some());
    }
}
