//! Role-to-screen routing.
//!
//! The rules are tested one by one, in order, and **every** rule whose role
//! the employee holds is applied. An employee with roles `{1, 3}` is sent to
//! Screen0 and then to Screen2, so Screen2 is what stays on the display:
//! the last matching rule wins. Rules do not short-circuit.

use kioskgate_directory::Employee;

use crate::{KioskDisplay, ScreenSelector};

/// "Employees holding `role` go to `screen`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    pub role: u32,
    pub screen: ScreenSelector,
}

impl RouteRule {
    pub const fn new(role: u32, screen: ScreenSelector) -> Self {
        Self { role, screen }
    }
}

/// The stock rule set: role 1 → Screen0, role 2 → Screen1, role 3 → Screen2.
const DEFAULT_RULES: [RouteRule; 3] = [
    RouteRule::new(1, ScreenSelector::Screen0),
    RouteRule::new(2, ScreenSelector::Screen1),
    RouteRule::new(3, ScreenSelector::Screen2),
];

/// Maps an employee's roles to screen transitions.
#[derive(Debug, Clone)]
pub struct NavigationRouter {
    rules: Vec<RouteRule>,
}

impl NavigationRouter {
    /// A router with a custom, ordered rule set.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Every screen transition the employee triggers, in rule order.
    pub fn transitions(&self, employee: &Employee) -> Vec<ScreenSelector> {
        self.rules
            .iter()
            .filter(|rule| employee.has_role(rule.role))
            .map(|rule| rule.screen)
            .collect()
    }

    /// The screen left showing after all transitions, or `None` when the
    /// employee holds no routed role.
    pub fn route(&self, employee: &Employee) -> Option<ScreenSelector> {
        self.transitions(employee).last().copied()
    }

    /// Applies the employee's transitions to `display` and shows their tag.
    ///
    /// Each matching rule produces one `set_current_screen` call, in order.
    /// The tag is forwarded even when no rule matches, in which case the
    /// current screen is left alone. Returns the final screen, if any.
    pub fn navigate<D>(
        &self,
        employee: &Employee,
        display: &D,
    ) -> Option<ScreenSelector>
    where
        D: KioskDisplay + ?Sized,
    {
        let transitions = self.transitions(employee);
        if transitions.is_empty() {
            tracing::warn!(
                employee_id = employee.id,
                roles = ?employee.employee_type,
                "no screen routed for employee roles"
            );
        }
        for screen in &transitions {
            display.set_current_screen(*screen);
        }
        display.set_screen_tag(&employee.rfid_tag);

        let last = transitions.last().copied();
        if let Some(screen) = last {
            tracing::info!(employee_id = employee.id, %screen, "navigated");
        }
        last
    }
}

impl Default for NavigationRouter {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use super::*;

    /// Records every call in order.
    #[derive(Default)]
    struct RecordingDisplay {
        calls: Mutex<Vec<String>>,
    }

    impl KioskDisplay for RecordingDisplay {
        fn set_current_screen(&self, screen: ScreenSelector) {
            self.calls.lock().unwrap().push(format!("screen:{screen}"));
        }

        fn set_screen_tag(&self, tag: &str) {
            self.calls.lock().unwrap().push(format!("tag:{tag}"));
        }
    }

    fn employee(roles: &[u32]) -> Employee {
        Employee {
            id: 12,
            rfid_tag: "023af76c".into(),
            employee_type: roles.iter().copied().collect(),
            status: BTreeSet::new(),
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
        }
    }

    // =====================================================================
    // route()
    // =====================================================================

    #[test]
    fn test_route_each_default_role_maps_to_its_screen() {
        let router = NavigationRouter::default();

        assert_eq!(router.route(&employee(&[1])), Some(ScreenSelector::Screen0));
        assert_eq!(router.route(&employee(&[2])), Some(ScreenSelector::Screen1));
        assert_eq!(router.route(&employee(&[3])), Some(ScreenSelector::Screen2));
    }

    #[test]
    fn test_route_multiple_roles_last_match_wins() {
        let router = NavigationRouter::default();

        assert_eq!(
            router.transitions(&employee(&[1, 3])),
            vec![ScreenSelector::Screen0, ScreenSelector::Screen2]
        );
        assert_eq!(router.route(&employee(&[1, 3])), Some(ScreenSelector::Screen2));
        assert_eq!(
            router.route(&employee(&[1, 2, 3])),
            Some(ScreenSelector::Screen2)
        );
    }

    #[test]
    fn test_route_follows_rule_order_not_role_order() {
        // Rule order decides, so reversing the rules flips the winner.
        let router = NavigationRouter::new(vec![
            RouteRule::new(3, ScreenSelector::Screen2),
            RouteRule::new(1, ScreenSelector::Screen0),
        ]);

        assert_eq!(router.route(&employee(&[1, 3])), Some(ScreenSelector::Screen0));
    }

    #[test]
    fn test_route_unrouted_roles_returns_none() {
        let router = NavigationRouter::default();

        assert_eq!(router.route(&employee(&[])), None);
        assert_eq!(router.route(&employee(&[9])), None);
    }

    // =====================================================================
    // navigate()
    // =====================================================================

    #[test]
    fn test_navigate_applies_every_transition_then_tag() {
        let router = NavigationRouter::default();
        let display = RecordingDisplay::default();

        let screen = router.navigate(&employee(&[1, 3]), &display);

        assert_eq!(screen, Some(ScreenSelector::Screen2));
        assert_eq!(
            *display.calls.lock().unwrap(),
            vec!["screen:screen0", "screen:screen2", "tag:023af76c"]
        );
    }

    #[test]
    fn test_navigate_without_match_only_forwards_tag() {
        let router = NavigationRouter::default();
        let display = RecordingDisplay::default();

        let screen = router.navigate(&employee(&[7]), &display);

        assert_eq!(screen, None);
        assert_eq!(*display.calls.lock().unwrap(), vec!["tag:023af76c"]);
    }
}
