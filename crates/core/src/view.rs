#![allow(missing_docs)]

//! Navigation state: current screen plus the menu, modal and chat overlays.

use tracing::debug;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Landing hero.
    #[default]
    Home,
    /// Arcade catalog grid.
    Games,
}

/// Where a navigation action points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Home,
    Games,
    /// Opens the leaderboard modal without changing the screen.
    Leaderboards,
}

/// Which control issued a navigation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOrigin {
    /// Full-width header tabs.
    Header,
    /// Compact drop-down menu; closes itself after selection.
    MobileMenu,
    /// Call-to-action buttons on the landing hero.
    Hero,
}

/// UI state owned by the top-level app. Every field is independent and every
/// transition is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewController {
    current_view: View,
    mobile_menu_open: bool,
    leaderboard_open: bool,
    chat_open: bool,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    pub fn leaderboard_open(&self) -> bool {
        self.leaderboard_open
    }

    pub fn chat_open(&self) -> bool {
        self.chat_open
    }

    /// Apply a navigation action.
    pub fn navigate(&mut self, target: NavTarget, origin: NavOrigin) {
        match target {
            NavTarget::Home => self.current_view = View::Home,
            NavTarget::Games => self.current_view = View::Games,
            NavTarget::Leaderboards => self.leaderboard_open = true,
        }
        if origin == NavOrigin::MobileMenu {
            self.mobile_menu_open = false;
        }
        debug!(?target, ?origin, view = ?self.current_view, "Navigated");
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn close_mobile_menu(&mut self) {
        self.mobile_menu_open = false;
    }

    pub fn close_leaderboard(&mut self) {
        self.leaderboard_open = false;
    }

    /// Floating chat launcher.
    pub fn toggle_chat(&mut self) {
        self.chat_open = !self.chat_open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_home_with_everything_closed() {
        let view = ViewController::new();
        assert_eq!(view.current_view(), View::Home);
        assert!(!view.mobile_menu_open());
        assert!(!view.leaderboard_open());
        assert!(!view.chat_open());
    }

    #[test]
    fn header_navigation_leaves_menu_alone() {
        let mut view = ViewController::new();
        view.toggle_mobile_menu();
        view.navigate(NavTarget::Games, NavOrigin::Header);
        assert_eq!(view.current_view(), View::Games);
        assert!(view.mobile_menu_open());
    }

    #[test]
    fn mobile_navigation_closes_menu() {
        let mut view = ViewController::new();
        view.toggle_mobile_menu();
        view.navigate(NavTarget::Games, NavOrigin::MobileMenu);
        assert_eq!(view.current_view(), View::Games);
        assert!(!view.mobile_menu_open());

        view.toggle_mobile_menu();
        view.navigate(NavTarget::Leaderboards, NavOrigin::MobileMenu);
        assert!(view.leaderboard_open());
        assert!(!view.mobile_menu_open());
        assert_eq!(view.current_view(), View::Games);
    }

    #[test]
    fn leaderboard_does_not_change_screen() {
        let mut view = ViewController::new();
        view.navigate(NavTarget::Leaderboards, NavOrigin::Header);
        assert!(view.leaderboard_open());
        assert_eq!(view.current_view(), View::Home);

        view.close_leaderboard();
        assert!(!view.leaderboard_open());
    }

    #[test]
    fn every_state_is_reachable_from_every_state() {
        let mut view = ViewController::new();
        view.navigate(NavTarget::Games, NavOrigin::Hero);
        view.navigate(NavTarget::Games, NavOrigin::Hero);
        assert_eq!(view.current_view(), View::Games);
        view.navigate(NavTarget::Home, NavOrigin::Header);
        assert_eq!(view.current_view(), View::Home);
        view.toggle_chat();
        assert!(view.chat_open());
        view.toggle_chat();
        assert!(!view.chat_open());
    }
}
