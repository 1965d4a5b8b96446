use std::borrow::Cow;

use crate::path::FieldPath;
use crate::tag::Tag;

/// Where a field's source string comes from.
///
/// A [`Populator`](crate::Populator) asks its sources in priority order,
/// highest first, and uses the first answer. Returning `None` means the
/// source has nothing to say about the field.
pub trait Source {
    fn lookup(&self, path: &FieldPath, tag: &Tag) -> Option<Cow<'_, str>>;
}

/// The field's declared default, from `#[example("...")]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tags;

impl Source for Tags {
    fn lookup(&self, _path: &FieldPath, tag: &Tag) -> Option<Cow<'_, str>> {
        tag.default_value().map(Cow::Borrowed)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn lookup(&self, path: &FieldPath, tag: &Tag) -> Option<Cow<'_, str>> {
        (**self).lookup(path, tag)
    }
}

impl<K, V, H> Source for std::collections::HashMap<K, V, H>
where
    K: std::borrow::Borrow<str> + Eq + std::hash::Hash,
    V: AsRef<str>,
    H: std::hash::BuildHasher,
{
    fn lookup(&self, path: &FieldPath, _tag: &Tag) -> Option<Cow<'_, str>> {
        self.get(path.to_string().as_str())
            .map(|value| Cow::Borrowed(value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn tags_answer_with_declared_default() {
        let path = FieldPath::root().child("port");
        assert_eq!(
            Tags.lookup(&path, &Tag::new().with_default("8080")).as_deref(),
            Some("8080")
        );
        assert_eq!(Tags.lookup(&path, &Tag::new()), None);
    }

    #[test]
    fn empty_default_is_an_answer() {
        let path = FieldPath::root().child("name");
        assert_eq!(
            Tags.lookup(&path, &Tag::new().with_default("")).as_deref(),
            Some("")
        );
    }

    #[test]
    fn hash_map_looks_up_dotted_path() {
        let map = HashMap::from([("db.url".to_string(), "pg://".to_string())]);
        let path = FieldPath::root().child("db").child("url");
        assert_eq!(map.lookup(&path, &Tag::new()).as_deref(), Some("pg://"));
        assert_eq!(map.lookup(&FieldPath::root().child("db"), &Tag::new()), None);
    }
}
