//! Tab identities and the registry of per-tab task overrides.

use crate::{
    error::Error,
    task::{
        TaskId,
        TaskSet,
    },
};

/// One selectable page of the UI, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tab {
    Home,
    Clock,
    Imu,
    Microphone,
    LedBar,
    Power,
    Touch,
    Crypto,
    Wifi,
    NextSteps,
}

impl Tab {
    pub const COUNT: usize = 10;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Home,
        Self::Clock,
        Self::Imu,
        Self::Microphone,
        Self::LedBar,
        Self::Power,
        Self::Touch,
        Self::Crypto,
        Self::Wifi,
        Self::NextSteps,
    ];

    /// Label handed to the tab view; unique per tab.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Clock => "CLOCK",
            Self::Imu => "MPU6886",
            Self::Microphone => "MICROPHONE",
            Self::LedBar => "LED BAR",
            Self::Power => "POWER",
            Self::Touch => "TOUCH",
            Self::Crypto => "ATECC608",
            Self::Wifi => "WI-FI",
            Self::NextSteps => "NEXT STEPS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.name() == name)
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl core::fmt::Display for Tab {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One-shot UI work a tab needs when it gains focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FocusAction {
    /// Re-read the clock into the time roller.
    RefreshClock,
    /// Wipe the touch canvas before its task starts drawing again.
    ResetTouchBackground,
}

/// What a tab changes relative to the default task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabEntry {
    pub tab: Tab,
    pub resume: TaskSet,
    pub suspend: TaskSet,
    pub on_focus: Option<FocusAction>,
}

impl TabEntry {
    pub const fn idle(tab: Tab) -> Self {
        Self {
            tab,
            resume: TaskSet::EMPTY,
            suspend: TaskSet::EMPTY,
            on_focus: None,
        }
    }

    pub const fn resumes(tab: Tab, resume: TaskSet) -> Self {
        Self {
            resume,
            ..Self::idle(tab)
        }
    }
}

/// Tasks parked on every transition unless the new tab claims them.
pub const DEFAULT_SUSPEND: TaskSet = TaskSet::of(&[
    TaskId::Imu,
    TaskId::Microphone,
    TaskId::Fft,
    TaskId::Wifi,
    TaskId::Touch,
    TaskId::LedBarSolid,
]);

/// Tasks running whenever no tab overrides them: the LED bar idles on its
/// animation.
pub const DEFAULT_RESUME: TaskSet = TaskSet::of(&[TaskId::LedBarAnimation]);

const DEFAULT_ENTRIES: [TabEntry; Tab::COUNT] = [
    TabEntry::idle(Tab::Home),
    TabEntry {
        on_focus: Some(FocusAction::RefreshClock),
        ..TabEntry::idle(Tab::Clock)
    },
    TabEntry::resumes(Tab::Imu, TaskSet::of(&[TaskId::Imu])),
    TabEntry::resumes(Tab::Microphone, TaskSet::of(&[TaskId::Microphone, TaskId::Fft])),
    TabEntry {
        tab: Tab::LedBar,
        resume: TaskSet::of(&[TaskId::LedBarSolid]),
        suspend: TaskSet::of(&[TaskId::LedBarAnimation]),
        on_focus: None,
    },
    TabEntry::idle(Tab::Power),
    TabEntry {
        on_focus: Some(FocusAction::ResetTouchBackground),
        ..TabEntry::resumes(Tab::Touch, TaskSet::of(&[TaskId::Touch]))
    },
    TabEntry::idle(Tab::Crypto),
    TabEntry::resumes(Tab::Wifi, TaskSet::of(&[TaskId::Wifi])),
    TabEntry::idle(Tab::NextSteps),
];

/// Immutable table from tab to its task overrides.
#[derive(Debug, Clone, Copy)]
pub struct TabRegistry<'a> {
    entries: &'a [TabEntry],
}

impl<'a> TabRegistry<'a> {
    /// The factory firmware's table.
    pub const DEFAULT: TabRegistry<'static> = TabRegistry {
        entries: &DEFAULT_ENTRIES,
    };

    /// Build a registry, rejecting tables that list a tab twice.
    pub fn new(entries: &'a [TabEntry]) -> Result<Self, Error> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|earlier| earlier.tab == entry.tab) {
                return Err(Error::DuplicateTab);
            }
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, tab: Tab) -> Option<&'a TabEntry> {
        self.entries.iter().find(|entry| entry.tab == tab)
    }

    pub fn entries(&self) -> &'a [TabEntry] {
        self.entries
    }

    /// Tasks that must be running while `tab` is focused. Tabs missing from
    /// the table get the default set.
    pub fn target(&self, tab: Tab) -> TaskSet {
        match self.lookup(tab) {
            Some(entry) => DEFAULT_RESUME.difference(entry.suspend).union(entry.resume),
            None => DEFAULT_RESUME,
        }
    }

    pub fn on_focus(&self, tab: Tab) -> Option<FocusAction> {
        self.lookup(tab).and_then(|entry| entry.on_focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_unique_and_complete() {
        let registry = TabRegistry::new(TabRegistry::DEFAULT.entries()).unwrap();
        for tab in Tab::ALL {
            assert_eq!(registry.lookup(tab).map(|e| e.tab), Some(tab));
        }
    }

    #[test]
    fn duplicate_tabs_are_rejected() {
        let entries = [TabEntry::idle(Tab::Home), TabEntry::idle(Tab::Clock), TabEntry::idle(Tab::Home)];
        assert_eq!(TabRegistry::new(&entries).unwrap_err(), Error::DuplicateTab);
    }

    #[test]
    fn names_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_name(tab.name()), Some(tab));
            assert_eq!(Tab::from_index(tab.index()), Some(tab));
        }
        assert_eq!(Tab::from_name("SETTINGS"), None);
        assert_eq!(Tab::from_index(Tab::COUNT), None);
    }

    #[test]
    fn home_runs_only_the_animation() {
        assert_eq!(TabRegistry::DEFAULT.target(Tab::Home), DEFAULT_RESUME);
    }

    #[test]
    fn led_bar_swaps_animation_for_solid() {
        assert_eq!(
            TabRegistry::DEFAULT.target(Tab::LedBar),
            TaskSet::of(&[TaskId::LedBarSolid])
        );
    }

    #[test]
    fn microphone_runs_capture_and_fft() {
        assert_eq!(
            TabRegistry::DEFAULT.target(Tab::Microphone),
            TaskSet::of(&[TaskId::Microphone, TaskId::Fft, TaskId::LedBarAnimation])
        );
    }

    #[test]
    fn missing_tab_falls_back_to_default() {
        let entries = [TabEntry::resumes(Tab::Imu, TaskSet::of(&[TaskId::Imu]))];
        let registry = TabRegistry::new(&entries).unwrap();
        assert_eq!(registry.target(Tab::Wifi), DEFAULT_RESUME);
        assert_eq!(registry.on_focus(Tab::Clock), None);
    }

    #[test]
    fn every_default_suspend_task_is_reachable() {
        let claimed: TaskSet = Tab::ALL
            .into_iter()
            .map(|tab| TabRegistry::DEFAULT.target(tab))
            .fold(TaskSet::EMPTY, TaskSet::union);
        assert_eq!(claimed, DEFAULT_SUSPEND.union(DEFAULT_RESUME));
    }
}
