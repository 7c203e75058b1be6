//! Role-driven sidebar navigation

use crate::models::Role;

/// Sidebar entry: either a link or a group of links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: &'static str,
    pub path: Option<String>,
    pub submenu: Vec<MenuItem>,
}

impl MenuItem {
    fn link(name: &'static str, path: impl Into<String>) -> Self {
        Self {
            name,
            path: Some(path.into()),
            submenu: Vec::new(),
        }
    }

    fn group(name: &'static str, submenu: Vec<MenuItem>) -> Self {
        Self {
            name,
            path: None,
            submenu,
        }
    }

    /// Whether this entry (or one of its children) is the current route
    pub fn is_active(&self, current_path: &str) -> bool {
        self.path.as_deref() == Some(current_path)
            || self.submenu.iter().any(|item| item.is_active(current_path))
    }
}

/// Sidebar entries for a role.
///
/// Settings links embed the user id; pass `None` before the user is known.
pub fn menu_for(role: Role, user_id: Option<&str>) -> Vec<MenuItem> {
    let prefix = role.route_prefix();
    let mut items = match role {
        Role::Admin => vec![
            MenuItem::link("Dashboard", "/admin/admin-dashboard"),
            MenuItem::link("Employee", "/admin/employees"),
            MenuItem::link("Create User", "/admin/adduser"),
            MenuItem::link("User List", "/admin/users"),
            MenuItem::link("Add Branch", "/admin/addbranch"),
            MenuItem::link("Branch List", "/admin/branches"),
            MenuItem::link("Report", "/admin/reports"),
            MenuItem::link("Reset Password", "/admin/resetpassword"),
        ],
        Role::Manager => vec![
            MenuItem::link("Dashboard", "/manager/manager-dasboard"),
            MenuItem::link("Buy Product", "/manager/buyproduct"),
            MenuItem::link("Add Product", "/manager/addproduct"),
            MenuItem::link("List Of Product", "/manager/productlist"),
            MenuItem::link("Category", "/manager/category"),
            MenuItem::link("Sell Product", "/manager/sellproduct"),
            MenuItem::link("Orders", "/manager/orders"),
            MenuItem::link("Report", "/manager/reports"),
        ],
        Role::Customer => vec![
            MenuItem::link("Dashboard", "/user/customer-dashboard"),
            MenuItem::link("Place Order", "/user/Userpage"),
            MenuItem::link("Order History", "/user/order-history"),
        ],
    };

    let uid = user_id.unwrap_or("undefined");
    items.push(MenuItem::group(
        "Settings",
        vec![
            MenuItem::link("Security Question", format!("{prefix}/security-question/{uid}")),
            MenuItem::link("Edit Profile", format!("{prefix}/edit-profile/{uid}")),
            MenuItem::link("Help", format!("{prefix}/help/{uid}")),
        ],
    ));

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[MenuItem]) -> Vec<&'static str> {
        items.iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_customer_menu() {
        let menu = menu_for(Role::Customer, Some("u1"));
        assert_eq!(
            names(&menu),
            vec!["Dashboard", "Place Order", "Order History", "Settings"]
        );

        let settings = menu.last().unwrap();
        assert!(settings.path.is_none());
        assert_eq!(
            settings.submenu[1].path.as_deref(),
            Some("/user/edit-profile/u1")
        );
    }

    #[test]
    fn test_every_role_ends_with_settings() {
        for role in [Role::Admin, Role::Manager, Role::Customer] {
            let menu = menu_for(role, Some("x"));
            let settings = menu.last().unwrap();
            assert_eq!(settings.name, "Settings");
            assert_eq!(settings.submenu.len(), 3);
            for item in &settings.submenu {
                assert!(item.path.as_deref().unwrap().starts_with(role.route_prefix()));
            }
        }
    }

    #[test]
    fn test_admin_and_manager_sizes() {
        assert_eq!(menu_for(Role::Admin, None).len(), 9);
        assert_eq!(menu_for(Role::Manager, None).len(), 9);
        assert_eq!(
            menu_for(Role::Manager, None)[1].path.as_deref(),
            Some("/manager/buyproduct")
        );
    }

    #[test]
    fn test_active_item() {
        let menu = menu_for(Role::Admin, Some("a1"));
        assert!(menu[0].is_active("/admin/admin-dashboard"));
        assert!(!menu[1].is_active("/admin/admin-dashboard"));

        let settings = menu.last().unwrap();
        assert!(settings.is_active("/admin/help/a1"));
    }

    #[test]
    fn test_landing_path_is_in_menu() {
        for role in [Role::Admin, Role::Manager, Role::Customer] {
            let menu = menu_for(role, None);
            assert!(menu.iter().any(|i| i.is_active(role.landing_path())));
        }
    }
}
