#[cfg(test)]
mod store_tests;

#[cfg(test)]
use crate::settings::NamedEnum;

/// Shared fixture enum for the settings tests.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Flavor {
    #[default]
    Vanilla,
    Chocolate,
    Strawberry,
}

#[cfg(test)]
impl NamedEnum for Flavor {
    const VARIANTS: &'static [Self] = &[Flavor::Vanilla, Flavor::Chocolate, Flavor::Strawberry];

    fn name(&self) -> &'static str {
        match self {
            Flavor::Vanilla => "Vanilla",
            Flavor::Chocolate => "Chocolate",
            Flavor::Strawberry => "Strawberry",
        }
    }
}
