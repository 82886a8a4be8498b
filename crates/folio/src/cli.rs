use folio_core::settings::error::Result;
use folio_core::{EnumSetting, EnumSource, NamedEnum, Setting, SettingsStore};

/// Persisted state of the sample toggle switch.
pub const SAMPLE_TOGGLE: Setting<bool> = Setting::new("settings_sample_boolean", false);

/// Persisted state of the sample choice picker, stored by name.
pub const SAMPLE_CHOICE: EnumSetting<SampleChoice> = EnumSetting::new("settings_sample_enum", SampleChoice::First);

/// The options offered by the sample choice picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleChoice {
    #[default]
    First,
    Second,
    Third,
}

impl NamedEnum for SampleChoice {
    const VARIANTS: &'static [Self] = &[SampleChoice::First, SampleChoice::Second, SampleChoice::Third];

    fn name(&self) -> &'static str {
        match self {
            SampleChoice::First => "First",
            SampleChoice::Second => "Second",
            SampleChoice::Third => "Third",
        }
    }
}

/// The settings page: a toggle and a choice picker bound to the store.
///
/// `open` reads both controls from the store; `commit` writes them back.
#[derive(Debug)]
pub struct SettingsPage {
    pub toggle: bool,
    pub choices: EnumSource<SampleChoice>,
}

impl SettingsPage {
    pub fn open(store: &SettingsStore) -> Self {
        let mut choices = EnumSource::default();
        choices.select_item(SAMPLE_CHOICE.get(store));
        Self {
            toggle: SAMPLE_TOGGLE.get(store),
            choices,
        }
    }

    pub fn commit(&self, store: &SettingsStore) -> Result<()> {
        SAMPLE_TOGGLE.set(store, self.toggle)?;
        SAMPLE_CHOICE.set(store, self.choices.selected_item())
    }

    pub fn render(&self) -> String {
        let choice = self.choices.selected_item();
        format!("toggle: {}\nchoice: {}", if self.toggle { "on" } else { "off" }, choice.name())
    }
}
