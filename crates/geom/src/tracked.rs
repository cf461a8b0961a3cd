/// A value paired with a dirty flag.
///
/// Every write through [`Tracked::set`] or [`Tracked::update`] marks the value
/// stale; the consumer clears the flag with [`Tracked::mark_clean`] after it has
/// refreshed whatever it derives from the value. New values start stale so the
/// first consumer always sees them.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    value: T,
    stale: bool,
}

impl<T> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self { value, stale: true }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and mark it stale.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.stale = true;
    }

    /// Mutate the value in place and mark it stale.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.stale = true;
        f(&mut self.value)
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_clean(&mut self) {
        self.stale = false;
    }
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
