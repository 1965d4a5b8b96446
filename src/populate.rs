use std::borrow::Cow;
use std::fmt;

use log::{debug, trace};

use crate::builder::PopulatorBuilder;
use crate::coerce::Coercer;
use crate::discover::discover_at;
use crate::error::ExemplarError;
use crate::path::FieldPath;
use crate::source::{Source, Tags};
use crate::tag::Tag;
use crate::value::Example;

/// Populates structs from an ordered list of sources.
///
/// Sources are kept in priority-ascending order: for each field the last
/// source that answers wins. The default populator reads tag defaults only.
pub struct Populator {
    layers: Vec<Box<dyn Source>>,
    coerce_missing: bool,
}

impl Default for Populator {
    fn default() -> Self {
        Self {
            layers: vec![Box::new(Tags)],
            coerce_missing: false,
        }
    }
}

impl fmt::Debug for Populator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Populator")
            .field("layers", &self.layers.len())
            .field("coerce_missing", &self.coerce_missing)
            .finish()
    }
}

impl Populator {
    pub fn builder() -> PopulatorBuilder {
        PopulatorBuilder::new()
    }

    pub(crate) fn from_layers(layers: Vec<Box<dyn Source>>, coerce_missing: bool) -> Self {
        Self {
            layers,
            coerce_missing,
        }
    }

    /// Populate every leaf field of `target` in declaration order.
    ///
    /// Stops at the first field that fails to convert. Fields before it keep
    /// their new values.
    pub fn populate<T: Example>(&self, target: &mut T) -> Result<(), ExemplarError> {
        self.populate_dyn(target)
    }

    pub fn populate_dyn(&self, target: &mut dyn Example) -> Result<(), ExemplarError> {
        self.populate_at(target, &FieldPath::root())
    }

    pub(crate) fn populate_at(
        &self,
        target: &mut dyn Example,
        prefix: &FieldPath,
    ) -> Result<(), ExemplarError> {
        for leaf in discover_at(target, prefix)? {
            let Some(value) = self.lookup(&leaf.path, &leaf.tag) else {
                debug!("no value for {}", leaf.path);
                continue;
            };
            trace!("assigning {:?} to {}", value, leaf.path);

            let type_name = leaf.value.type_name();
            Coercer::new(self, &leaf.path)
                .coerce(&value, leaf.value)
                .map_err(|source| ExemplarError::FieldAssign {
                    field: leaf.name,
                    path: leaf.path.clone(),
                    type_name,
                    value: value.clone().into_owned(),
                    source,
                })?;
        }
        Ok(())
    }

    /// The source string for one field, from the highest layer that answers.
    pub fn lookup(&self, path: &FieldPath, tag: &Tag) -> Option<Cow<'_, str>> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.lookup(path, tag))
            .or_else(|| self.coerce_missing.then_some(Cow::Borrowed("")))
    }
}

/// Populate `target` from its tag defaults.
///
/// ```ignore
/// #[derive(Default, exemplar::Example)]
/// struct Server {
///     #[example("localhost")]
///     host: String,
///     #[example(8080)]
///     port: u16,
/// }
///
/// let mut server = Server::default();
/// exemplar::populate(&mut server)?;
/// assert_eq!(server.port, 8080);
/// ```
pub fn populate<T: Example>(target: &mut T) -> Result<(), ExemplarError> {
    Populator::default().populate(target)
}

/// Like [`populate`], but panics with the error message on failure.
pub fn must_populate<T: Example>(target: &mut T) {
    if let Err(err) = populate(target) {
        panic!("{err}");
    }
}
