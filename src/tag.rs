/// Per-field metadata supplied by the derive (or a hand-written `Struct`
/// impl): the default source value and whether the field is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tag {
    default: Option<&'static str>,
    ignored: bool,
}

impl Tag {
    pub const fn new() -> Self {
        Self {
            default: None,
            ignored: false,
        }
    }

    pub const fn with_default(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub const fn ignore(self) -> Self {
        Self {
            ignored: true,
            ..self
        }
    }

    /// The tag's default value, if one was declared. An empty string is a
    /// declared value.
    pub fn default_value(&self) -> Option<&'static str> {
        self.default
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}
