//! Focus coordinator: the tab-change state machine.
//!
//! The only state is the focused tab. A transition resolves the new tab's
//! target task set from the [`TabRegistry`], parks every coordinated task
//! outside it, runs the tab's one-shot focus action, then wakes every task
//! inside it. All parks finish before the first wake, so a task is never left
//! running because of the order in which defaults and overrides were applied.
//!
//! The coordinator runs synchronously inside the UI event dispatch. It never
//! creates or destroys tasks; it only flips their gates.

use crate::{
    error::Error,
    tabs::{
        FocusAction,
        Tab,
        TabRegistry,
    },
    task::{
        TaskId,
        TaskRegistry,
        TaskSet,
    },
};

/// UI side effects a tab may request when it gains focus.
pub trait FocusHooks {
    fn refresh_clock(&mut self);
    fn reset_touch_background(&mut self);
}

/// Hooks for callers that have no widgets to refresh.
pub struct NoHooks;

impl FocusHooks for NoHooks {
    fn refresh_clock(&mut self) {}

    fn reset_touch_background(&mut self) {}
}

pub struct FocusCoordinator<'a, R> {
    registry: &'a TabRegistry<'a>,
    tasks: &'a R,
    current: Tab,
}

impl<'a, R: TaskRegistry> FocusCoordinator<'a, R> {
    /// A coordinator focused on the home tab. Call [`start`](Self::start)
    /// once the tasks exist to put them in the home state.
    pub const fn new(registry: &'a TabRegistry<'a>, tasks: &'a R) -> Self {
        Self {
            registry,
            tasks,
            current: Tab::Home,
        }
    }

    pub const fn current(&self) -> Tab {
        self.current
    }

    /// Apply the landing tab's task state.
    pub fn start(&mut self) -> TaskSet {
        self.transition(Tab::Home, &mut NoHooks)
    }

    /// Tab-change handler.
    pub fn on_tab_changed(&mut self, tab: Tab, hooks: &mut impl FocusHooks) -> TaskSet {
        info!("Current active tab: {}", tab);
        self.transition(tab, hooks)
    }

    /// Tab-change handler for toolkits that report the tab by its label.
    pub fn on_tab_name(&mut self, name: &str, hooks: &mut impl FocusHooks) -> Result<TaskSet, Error> {
        let Some(tab) = Tab::from_name(name) else {
            warn!("tab change to unknown tab {}", name);
            return Err(Error::UnknownTab);
        };
        Ok(self.on_tab_changed(tab, hooks))
    }

    /// Tab-change handler for toolkits that report the focused position.
    pub fn on_tab_index(&mut self, index: usize, hooks: &mut impl FocusHooks) -> Result<TaskSet, Error> {
        let Some(tab) = Tab::from_index(index) else {
            warn!("tab change to unknown index {}", index);
            return Err(Error::UnknownTab);
        };
        Ok(self.on_tab_changed(tab, hooks))
    }

    fn transition(&mut self, tab: Tab, hooks: &mut impl FocusHooks) -> TaskSet {
        let target = self.registry.target(tab);

        for id in TaskId::ALL {
            if !target.contains(id) {
                self.tasks.task(id).suspend();
            }
        }

        match self.registry.on_focus(tab) {
            Some(FocusAction::RefreshClock) => hooks.refresh_clock(),
            Some(FocusAction::ResetTouchBackground) => hooks.reset_touch_background(),
            None => {}
        }

        for id in target.iter() {
            self.tasks.task(id).resume();
        }

        debug!("{} tasks active", target.len());
        self.current = tab;
        target
    }
}
