/// Title shown when no module has claimed the title bar.
pub const DEFAULT_TITLE: &str = "Server Admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    /// Host command run when the item is chosen.
    pub command: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// Navigation target; `None` marks the current location.
    pub target: Option<String>,
}

impl Breadcrumb {
    pub fn link(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: Some(target.into()),
        }
    }

    pub fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }
}

/// Application-level title bar state shared by every module.
///
/// Modules receive it explicitly on mount and unmount instead of reaching for
/// a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBar {
    title: String,
    menu_items: Vec<MenuItem>,
    breadcrumbs: Vec<Breadcrumb>,
}

impl Default for TitleBar {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            menu_items: Vec::new(),
            breadcrumbs: Vec::new(),
        }
    }
}

impl TitleBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    pub fn set_menu_items(&mut self, items: Vec<MenuItem>) {
        self.menu_items = items;
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.breadcrumbs
    }

    pub fn set_breadcrumbs(&mut self, crumbs: Vec<Breadcrumb>) {
        self.breadcrumbs = crumbs;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Breadcrumbs joined with " / ", or the title when there are none.
    pub fn trail(&self) -> String {
        if self.breadcrumbs.is_empty() {
            return self.title.clone();
        }
        self.breadcrumbs
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_defaults() {
        let mut bar = TitleBar::new();
        bar.set_title("Maps");
        bar.set_breadcrumbs(vec![
            Breadcrumb::link("Dashboard", "dashboard"),
            Breadcrumb::current("Maps"),
        ]);
        bar.set_menu_items(vec![MenuItem::new("New Map", "new")]);
        assert_eq!(bar.trail(), "Dashboard / Maps");

        bar.reset();
        assert_eq!(bar, TitleBar::default());
        assert_eq!(bar.trail(), DEFAULT_TITLE);
    }
}
