use crate::color::Color;

/// Where a candidate color was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `background` / `background-color` declarations.
    Background,
    /// `color` declarations (text).
    Text,
    /// Any `border*` declaration.
    Border,
    /// `box-shadow` / `text-shadow` declarations.
    Accent,
    /// Colors quantized out of site imagery.
    Image,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Background,
        Category::Text,
        Category::Border,
        Category::Accent,
        Category::Image,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Background => "background",
            Category::Text => "color",
            Category::Border => "border",
            Category::Accent => "accent",
            Category::Image => "image",
        }
    }

    /// Map a CSS property name to the category its colors belong to.
    pub fn from_property(property: &str) -> Option<Category> {
        let property = property.trim().to_ascii_lowercase();
        match property.as_str() {
            "background" | "background-color" => Some(Category::Background),
            "color" => Some(Category::Text),
            "box-shadow" | "text-shadow" => Some(Category::Accent),
            p if p.starts_with("border") => Some(Category::Border),
            _ => None,
        }
    }
}

/// Candidate colors grouped by category.
///
/// Every category is always present. Within a category colors keep their
/// insertion order and duplicates are dropped, so "first" is well defined
/// wherever the selection policy falls back to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    background: Vec<Color>,
    text: Vec<Color>,
    border: Vec<Color>,
    accent: Vec<Color>,
    image: Vec<Color>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &[Color] {
        match category {
            Category::Background => &self.background,
            Category::Text => &self.text,
            Category::Border => &self.border,
            Category::Accent => &self.accent,
            Category::Image => &self.image,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<Color> {
        match category {
            Category::Background => &mut self.background,
            Category::Text => &mut self.text,
            Category::Border => &mut self.border,
            Category::Accent => &mut self.accent,
            Category::Image => &mut self.image,
        }
    }

    /// Append a color unless the category already holds it.
    pub fn push(&mut self, category: Category, color: Color) {
        let list = self.get_mut(category);
        if !list.contains(&color) {
            list.push(color);
        }
    }

    pub fn extend<I: IntoIterator<Item = Color>>(&mut self, category: Category, colors: I) {
        for color in colors {
            self.push(category, color);
        }
    }

    /// Append every category of `other` after this pool's own entries.
    pub fn merge(&mut self, other: &CandidatePool) {
        for category in Category::ALL {
            self.extend(category, other.get(category).iter().copied());
        }
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Candidates in accent priority order: shadow-derived accents, then
    /// imagery, borders, text and finally backgrounds.
    pub fn accent_priority(&self) -> Vec<Color> {
        [
            Category::Accent,
            Category::Image,
            Category::Border,
            Category::Text,
            Category::Background,
        ]
        .iter()
        .flat_map(|c| self.get(*c).iter().copied())
        .collect()
    }
}

/// Drop repeated items, keeping the first occurrence.
pub fn dedup_in_order<T: PartialEq + Clone>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}
