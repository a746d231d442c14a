//! Terminal rendering of the session screens
//!
//! Mirrors the dashboard's top-level routing. A busy session shows the
//! loading screen; otherwise the sign-in prompt or the role's dashboard.

use std::fmt::Write;

use society_session::{Screen, SessionState, User, UserRole};

/// Navigation entry in the dashboard menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub label: &'static str,
}

const DASHBOARD: MenuItem = MenuItem { id: "dashboard", label: "Dashboard" };
const USERS: MenuItem = MenuItem { id: "users", label: "Users" };
const ANALYTICS: MenuItem = MenuItem { id: "analytics", label: "Analytics" };
const PAYMENTS: MenuItem = MenuItem { id: "payments", label: "Payments" };
const MAINTENANCE: MenuItem = MenuItem { id: "maintenance", label: "Maintenance" };
const NOTICES: MenuItem = MenuItem { id: "notices", label: "Notices" };
const SETTINGS: MenuItem = MenuItem { id: "settings", label: "Settings" };

/// Menu for a role. Administrators additionally get user management and analytics.
pub fn menu_for(role: UserRole) -> Vec<MenuItem> {
    let mut items = vec![DASHBOARD];
    if role == UserRole::Administrator {
        items.extend([USERS, ANALYTICS]);
    }
    items.extend([PAYMENTS, MAINTENANCE, NOTICES, SETTINGS]);
    items
}

/// Render the screen for a session state.
pub fn render(state: &SessionState) -> String {
    match state.screen() {
        Screen::Loading => "Loading...\n".to_string(),
        Screen::SignIn { error } => {
            let mut out = String::from("Society Manager: please sign in\n");
            if let Some(error) = error {
                let _ = writeln!(out, "  error: {}", error);
            }
            out.push_str("  run: society-session login --email <address>\n");
            out
        }
        Screen::Dashboard(user) => render_dashboard(user),
    }
}

fn render_dashboard(user: &User) -> String {
    let mut out = String::new();
    let subtitle = match user.flat() {
        Some(flat) => format!("Flat {}", flat),
        None => "Admin Dashboard".to_string(),
    };
    let _ = writeln!(out, "Society Manager · {}", subtitle);
    let _ = writeln!(out, "Welcome back, {}!", user.name);

    match (user.role, user.flat()) {
        (UserRole::Administrator, _) => {
            out.push_str("Here's an overview of your society management dashboard.\n");
        }
        (UserRole::Resident, Some(flat)) => {
            let _ = writeln!(out, "Here's your personalized dashboard for flat {}.", flat);
        }
        (UserRole::Resident, None) => {
            out.push_str("Here's your personalized dashboard.\n");
        }
    }

    out.push('\n');
    for item in menu_for(user.role) {
        let _ = writeln!(out, "  [{}] {}", item.id, item.label);
    }
    out
}
