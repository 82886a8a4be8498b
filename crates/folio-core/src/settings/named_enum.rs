use log::warn;

use crate::settings::error::{Result, SettingsError};
use crate::settings::store::SettingsStore;

/// An enum with a fixed list of variants and a stable name for each.
///
/// Settings persist enums by name, so renaming a variant's name orphans
/// stored values; they fall back to the setting's default.
pub trait NamedEnum: Copy + Eq + 'static {
    /// Every variant, in display order.
    const VARIANTS: &'static [Self];

    fn name(&self) -> &'static str;

    /// The variant whose name is exactly `name`.
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|variant| variant.name() == name)
    }

    fn parse_name(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| SettingsError::UnknownVariant {
            type_name: std::any::type_name::<Self>(),
            name: name.to_string(),
        })
    }
}

/// A settings key holding a [`NamedEnum`] by variant name.
#[derive(Debug, Clone, Copy)]
pub struct EnumSetting<E> {
    key: &'static str,
    default: E,
}

impl<E: NamedEnum> EnumSetting<E> {
    pub const fn new(key: &'static str, default: E) -> Self {
        Self { key, default }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> E {
        self.default
    }

    /// The stored variant. Unset values and unknown names give the default.
    pub fn get(&self, store: &SettingsStore) -> E {
        match store.get::<String>(self.key) {
            Some(name) => E::from_name(&name).unwrap_or_else(|| {
                warn!(
                    "Setting '{}' holds unknown variant '{}', using '{}'",
                    self.key,
                    name,
                    self.default.name()
                );
                self.default
            }),
            None => self.default,
        }
    }

    pub fn set(&self, store: &SettingsStore, value: E) -> Result<()> {
        store.set(self.key, value.name())
    }

    /// Store the variant called `name`, rejecting unknown names.
    pub fn set_by_name(&self, store: &SettingsStore, name: &str) -> Result<E> {
        let value = E::parse_name(name)?;
        self.set(store, value)?;
        Ok(value)
    }

    pub fn reset(&self, store: &SettingsStore) {
        store.remove(self.key);
    }
}

/// The variants of `E` with one of them selected, as a picker binds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumSource<E> {
    selected: E,
}

impl<E: NamedEnum + Default> Default for EnumSource<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

impl<E: NamedEnum> EnumSource<E> {
    pub fn new(selected: E) -> Self {
        Self { selected }
    }

    pub fn items(&self) -> &'static [E] {
        E::VARIANTS
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        E::VARIANTS.iter().map(|variant| variant.name())
    }

    pub fn select_item(&mut self, item: E) {
        self.selected = item;
    }

    /// Select the variant called `name`. The selection is unchanged on error.
    pub fn select_name(&mut self, name: &str) -> Result<E> {
        self.selected = E::parse_name(name)?;
        Ok(self.selected)
    }

    pub fn selected_item(&self) -> E {
        self.selected
    }

    pub fn selected_index(&self) -> Option<usize> {
        E::VARIANTS.iter().position(|variant| *variant == self.selected)
    }
}
