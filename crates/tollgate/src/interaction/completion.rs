//! Autocomplete suggestions

use serenity::builder::AutocompleteChoice;

/// The most suggestions Discord will display for one autocomplete request
pub const MAX_CHOICES: usize = 25;

/// A suggested value for the option being autocompleted
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The label shown to the user
    pub name: String,
    /// The value filled in when the suggestion is picked
    pub value: CompletionValue,
}

impl Completion {
    /// Construct a new suggestion
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<CompletionValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Suggest each candidate starting with `typed`, ignoring case, using the
    /// candidate as both label and value
    ///
    /// At most [`MAX_CHOICES`] suggestions are returned, in candidate order.
    #[must_use]
    pub fn matching<'a>(candidates: impl IntoIterator<Item = &'a str>, typed: &str) -> Vec<Self> {
        let typed = typed.to_lowercase();

        candidates
            .into_iter()
            .filter(|c| c.to_lowercase().starts_with(&typed))
            .take(MAX_CHOICES)
            .map(|c| Self::new(c, c))
            .collect()
    }

    /// Convert this suggestion into a serenity autocomplete choice
    #[must_use]
    pub fn into_choice(self) -> AutocompleteChoice {
        let Self { name, value } = self;

        match value {
            CompletionValue::Int(i) => AutocompleteChoice::new(name, i),
            CompletionValue::String(s) => AutocompleteChoice::new(name, s),
            CompletionValue::Real(r) => AutocompleteChoice::new(name, r),
        }
    }
}

/// The value of a suggestion, matching the type of the option it completes
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionValue {
    /// For integer options
    Int(i64),
    /// For string options
    String(String),
    /// For number options
    Real(f64),
}

macro_rules! from_value {
    ($($ty:ty => |$v:ident| $expr:expr),* $(,)?) => {
        $(
            impl From<$ty> for CompletionValue {
                fn from($v: $ty) -> Self { $expr }
            }
        )*
    };
}

from_value! {
    i64 => |v| Self::Int(v),
    i32 => |v| Self::Int(v.into()),
    String => |v| Self::String(v),
    &String => |v| Self::String(v.clone()),
    &str => |v| Self::String(v.into()),
    f64 => |v| Self::Real(v),
}
