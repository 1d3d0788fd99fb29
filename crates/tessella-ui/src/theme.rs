use indexmap::IndexMap;

use tessella_graphics::Color;

/// Named color palette shared across an application.
///
/// Insertion order is preserved so palettes enumerate the way they were
/// declared, which keeps debug dumps and theme editors stable.
#[derive(Clone, Debug, Default)]
pub struct Theme {
    colors: IndexMap<String, Color>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Sets or, with `None`, removes a named color.
    pub fn set_color(&mut self, name: impl Into<String>, color: Option<Color>) {
        match color {
            Some(color) => {
                self.colors.insert(name.into(), color);
            }
            None => {
                self.colors.shift_remove(&name.into());
            }
        }
    }

    pub fn set_colors(&mut self, colors: impl IntoIterator<Item = (String, Color)>) {
        for (name, color) in colors {
            self.colors.insert(name, color);
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.colors.iter().map(|(name, color)| (name.as_str(), *color))
    }
}
