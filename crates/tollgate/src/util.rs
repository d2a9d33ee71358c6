use std::fmt;

/// A wrapper that hides its contents from [`Debug`](fmt::Debug) output
///
/// Used for bot tokens and client secrets so that they never end up in log
/// lines or panic messages.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// Borrow the wrapped secret
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &T { &self.0 }
}

impl<T> fmt::Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T> From<T> for Redacted<T> {
    fn from(val: T) -> Self { Self(val) }
}

/// Chaining helpers for serenity's by-value builders
pub(crate) trait BuilderHelpers: Sized {
    /// Apply `f` to `self` if `value` is `Some`, else return `self`
    #[inline]
    #[must_use]
    fn fold_opt<T, F: FnOnce(Self, T) -> Self>(self, value: Option<T>, f: F) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }
}

impl<T> BuilderHelpers for T {}

/// Convert each item of a list, or return `None` if it is empty
pub(crate) fn non_empty<T, U: From<T>>(items: Vec<T>) -> Option<Vec<U>> {
    if items.is_empty() {
        None
    } else {
        Some(items.into_iter().map(Into::into).collect())
    }
}
